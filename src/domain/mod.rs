//! Pure domain types with minimal dependencies
//!
//! This module contains the shapes, geometry primitives and selection
//! types used throughout the crate. Nothing here knows about managers,
//! tracking data or pixel output.

pub mod annotation;
pub mod geometry;
pub mod selection;

pub use annotation::*;
pub use geometry::*;
pub use selection::*;

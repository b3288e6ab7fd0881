//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations for arrow bodies, heads, zones and sectors
//! - The scene: live item registry, z-order and the handle layer
//! - Image rendering using tiny-skia (for saving to file)

pub mod geometry;
pub mod image;
pub mod scene;

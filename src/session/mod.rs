//! Tactics session management
//!
//! A session owns the annotation board, the tracking data it is drawn over
//! and the tactical engine that turns associated arrows into movement.

pub mod state;

pub use state::{Session, TeamColors};

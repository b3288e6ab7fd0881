//! Tactical simulation over tracked match data
//!
//! - `tracking`: the tracking-data trait and its in-memory implementation
//! - `tactical`: arrow-to-player association and projected movement
//! - `trajectory`: cached real future trajectories and trail fading

pub mod tactical;
pub mod tracking;
pub mod trajectory;

pub use tactical::{
    ActionType, AssociationOutcome, AssociationPrompt, PossessionLink, SimulatedSample,
    SimulatedTrajectories, TacticalArrow, TacticalSimulation,
};
pub use tracking::{FrameSample, Half, MatchTracking, Team, TrackingData};
pub use trajectory::{FutureTrajectories, TrailKind, TrajectoryCache, TrajectorySample};

//! Tactical annotation and movement simulation for tracked football matches

pub mod annotations;
pub mod config;
pub mod domain;
pub mod render;
pub mod scenario;
pub mod session;
pub mod simulation;

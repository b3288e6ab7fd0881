//! Annotation managers, the resize controller, and board message handlers
//!
//! This module provides:
//! - The resize/move controller shared by every shape family
//! - One manager per shape family (arrows and the three zone kinds)
//! - The board, which owns the managers and the scene
//! - Message handlers for BoardMsg

pub mod arrows;
pub mod board;
pub mod controller;
pub mod handlers;
pub mod messages;
pub mod store;
pub mod zones;

pub use board::Board;
pub use handlers::handle_board_msg;
pub use messages::{BoardEvent, BoardMsg, PointerAction, PointerButton, StyleMsg, Tool};

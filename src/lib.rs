//! Duel board engine
//!
//! A zone-based card board for two players, changed only through recorded
//! operations. Supports linear undo/redo over full snapshots and replaying
//! a recorded duel from its starting board, step by step or to any point.

pub mod core;
pub mod error;
pub mod game;
pub mod operation;
pub mod undo;
pub mod zones;

pub use error::{BoardError, Result};

//! Board state, transitions, history-backed engine and replay

pub mod actions;
pub mod engine;
pub mod logger;
pub mod phase;
pub mod replay;
pub mod snapshot;
pub mod state;
pub mod state_hash;

pub use actions::{apply_operation, Position};
pub use engine::{Annotation, EngineConfig, GameEngine};
pub use logger::{GameLogger, LogEntry, OutputFormat, OutputMode, VerbosityLevel};
pub use phase::Phase;
pub use replay::{reconstruct, PlaybackState, Replay, ReplaySession};
pub use snapshot::ReplayFile;
pub use state::{GameState, PlayerBoard, Players, Stack};
pub use state_hash::{compute_state_hash, format_hash};

//! Deterministic board hashing
//!
//! Hashes the canonical JSON form of a `GameState`, leaving out artwork
//! references. Used to compare boards across replays and to spot the step
//! at which two reconstructions diverge.

use crate::game::GameState;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Fields that do not take part in the hash
///
/// Artwork URLs depend on the host serving the deck, not on the duel.
const EXCLUDED_FIELDS: &[&str] = &["imageUrl"];

/// Compute a deterministic hash of the board
///
/// Two boards that differ only in excluded fields hash the same.
pub fn compute_state_hash(state: &GameState) -> u64 {
    let json_value = match serde_json::to_value(state) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Warning: Failed to serialize game state for hashing: {}", e);
            return 0;
        }
    };

    let cleaned = strip_metadata(json_value);

    let canonical = match serde_json::to_string(&cleaned) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Warning: Failed to canonicalize cleaned state: {}", e);
            return 0;
        }
    };

    let mut hasher = FxHasher::default();
    canonical.hash(&mut hasher);
    hasher.finish()
}

/// Recursively strip excluded fields from a JSON value
fn strip_metadata(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(key, _)| !EXCLUDED_FIELDS.contains(&key.as_str()))
                .map(|(key, v)| (key, strip_metadata(v)))
                .collect(),
        ),
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(strip_metadata).collect())
        }
        other => other,
    }
}

/// Format a hash for display (shows first 8 hex digits)
pub fn format_hash(hash: u64) -> String {
    format!("{:08x}", (hash >> 32) as u32)
}

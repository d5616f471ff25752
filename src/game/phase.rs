//! Turn phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of a duel turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Draw,
    Standby,
    Main1,
    Battle,
    Main2,
    End,
}

impl Phase {
    /// Get the next phase in turn order
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Draw => Some(Phase::Standby),
            Phase::Standby => Some(Phase::Main1),
            Phase::Main1 => Some(Phase::Battle),
            Phase::Battle => Some(Phase::Main2),
            Phase::Main2 => Some(Phase::End),
            Phase::End => None, // End of turn
        }
    }

    /// Short label used in operation descriptions
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Draw => "Draw Phase",
            Phase::Standby => "Standby Phase",
            Phase::Main1 => "Main Phase 1",
            Phase::Battle => "Battle Phase",
            Phase::Main2 => "Main Phase 2",
            Phase::End => "End Phase",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

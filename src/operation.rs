//! Operation log
//!
//! Every board change is recorded as a `GameOperation`. The log is the
//! source of truth for replay: snapshots in the history can always be
//! re-derived by applying operations to the starting state.

use crate::core::{Card, CardId, OperationId, Player};
use crate::game::{GameState, Phase};
use crate::zones::{find_card, StackPosition, ZoneId};
use serde::{Deserialize, Serialize};

/// Modifiers of a card move
///
/// `shift_key` is the desktop modifier; `defense_mode` and `face_down_mode`
/// are the equivalent toggles on touch devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoveOptions {
    pub shift_key: bool,
    pub defense_mode: bool,
    pub face_down_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_position: Option<StackPosition>,
    pub prevent_same_zone_reorder: bool,
}

impl MoveOptions {
    pub fn shift() -> Self {
        MoveOptions {
            shift_key: true,
            ..Default::default()
        }
    }

    pub fn with_stack_position(mut self, position: StackPosition) -> Self {
        self.stack_position = Some(position);
        self
    }
}

/// Type-specific payload of an operation
///
/// Serialized with a `type` tag. Operations of an unknown type deserialize
/// to `Unknown` and are ignored when applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OperationKind {
    /// Move a card between (or within) zones
    #[serde(rename_all = "camelCase")]
    Move {
        from: ZoneId,
        to: ZoneId,
        #[serde(default)]
        options: MoveOptions,
    },

    /// Set a card's rotation
    Rotate { from: ZoneId, angle: i32 },

    /// Toggle face-down
    #[serde(alias = "flip")]
    ChangePosition { from: ZoneId },

    ToggleHighlight { from: ZoneId },

    /// Set a card's counter (values <= 0 clear it)
    UpdateCounter { from: ZoneId, value: i32 },

    /// Top card of the deck to the hand
    Draw { from: ZoneId, to: ZoneId },

    /// Place a fabricated token card
    Summon { to: ZoneId, token: Card },

    /// Reorder the deck to the recorded card order
    #[serde(rename_all = "camelCase")]
    Shuffle { new_order: Vec<CardId> },

    /// Set a player's life points
    LifePoints { value: i32 },

    /// Advance phase/turn
    #[serde(rename_all = "camelCase")]
    ChangePhase {
        phase: Phase,
        turn: u32,
        current_player: Player,
    },

    /// Visual annotations for the presentation layer; never change the board
    Activate { from: ZoneId },
    Target { from: ZoneId },
    Negate { from: ZoneId },

    #[serde(other)]
    Unknown,
}

impl OperationKind {
    /// Type tag as it appears in the serialized log
    pub fn type_name(&self) -> &'static str {
        match self {
            OperationKind::Move { .. } => "move",
            OperationKind::Rotate { .. } => "rotate",
            OperationKind::ChangePosition { .. } => "changePosition",
            OperationKind::ToggleHighlight { .. } => "toggleHighlight",
            OperationKind::UpdateCounter { .. } => "updateCounter",
            OperationKind::Draw { .. } => "draw",
            OperationKind::Summon { .. } => "summon",
            OperationKind::Shuffle { .. } => "shuffle",
            OperationKind::LifePoints { .. } => "lifePoints",
            OperationKind::ChangePhase { .. } => "changePhase",
            OperationKind::Activate { .. } => "activate",
            OperationKind::Target { .. } => "target",
            OperationKind::Negate { .. } => "negate",
            OperationKind::Unknown => "unknown",
        }
    }

    /// Annotations are recorded but never change the board
    pub fn is_annotation(&self) -> bool {
        matches!(
            self,
            OperationKind::Activate { .. } | OperationKind::Target { .. } | OperationKind::Negate { .. }
        )
    }
}

/// Immutable record of one board change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOperation {
    pub id: OperationId,

    /// Milliseconds since the Unix epoch
    pub timestamp: u64,

    pub player: Player,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<CardId>,

    #[serde(flatten)]
    pub kind: OperationKind,
}

impl GameOperation {
    /// Human-readable sentence for this operation
    ///
    /// `state` is used to resolve card names; pass the board the operation
    /// was applied to (or produced), whichever still holds the card.
    pub fn describe(&self, state: &GameState) -> String {
        let name = self
            .card_id
            .as_ref()
            .map(|id| match find_card(state, id) {
                Some((_, card)) if !card.name.as_str().is_empty() => card.name.to_string(),
                _ => id.to_string(),
            })
            .unwrap_or_else(|| "card".to_string());

        match &self.kind {
            OperationKind::Move { from, to, options } => {
                let mut text = format!("Move {name} from {from} to {to}");
                if options.shift_key || options.defense_mode {
                    text.push_str(" (defense)");
                } else if options.face_down_mode {
                    text.push_str(" (face-down)");
                }
                text
            }
            OperationKind::Rotate { angle, .. } => format!("Rotate {name} to {angle}°"),
            OperationKind::ChangePosition { .. } => format!("Flip {name}"),
            OperationKind::ToggleHighlight { .. } => format!("Toggle highlight on {name}"),
            OperationKind::UpdateCounter { value, .. } if *value <= 0 => {
                format!("Clear counter on {name}")
            }
            OperationKind::UpdateCounter { value, .. } => format!("Set counter on {name} to {value}"),
            OperationKind::Draw { .. } => format!("{} draws {name}", self.player),
            OperationKind::Summon { to, token } => format!("Summon token {} to {to}", token.name),
            OperationKind::Shuffle { .. } => format!("Shuffle {} deck", self.player),
            OperationKind::LifePoints { value } => {
                format!("Set {} life points to {value}", self.player)
            }
            OperationKind::ChangePhase {
                phase,
                turn,
                current_player,
            } => format!("Turn {turn} ({current_player}): {phase}"),
            OperationKind::Activate { .. } => format!("Activate {name}"),
            OperationKind::Target { .. } => format!("Target {name}"),
            OperationKind::Negate { .. } => format!("Negate {name}"),
            OperationKind::Unknown => "Unknown operation".to_string(),
        }
    }
}

/// Append-only log of operations (most recent at end)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLog {
    operations: Vec<GameOperation>,

    /// Next sequence number for operation ids; never rewinds
    next_seq: u64,
}

impl OperationLog {
    pub fn new() -> Self {
        OperationLog::default()
    }

    /// Build and append a new operation, returning a reference to it
    pub fn record(
        &mut self,
        timestamp: u64,
        player: Player,
        card_id: Option<CardId>,
        kind: OperationKind,
    ) -> &GameOperation {
        let id = OperationId::from_sequence(self.next_seq);
        self.next_seq += 1;
        self.operations.push(GameOperation {
            id,
            timestamp,
            player,
            card_id,
            kind,
        });
        &self.operations[self.operations.len() - 1]
    }

    /// Append an already-recorded operation (replay)
    ///
    /// Ids recorded afterwards continue past the appended one's sequence.
    pub fn append(&mut self, operation: GameOperation) {
        if let Some(seq) = operation.id.sequence() {
            self.next_seq = self.next_seq.max(seq + 1);
        }
        self.operations.push(operation);
    }

    /// Discard every operation after the first `len`
    pub fn truncate(&mut self, len: usize) {
        self.operations.truncate(len);
    }

    /// Replace the log contents with a recorded slice
    pub fn restore(&mut self, operations: &[GameOperation]) {
        self.operations.clear();
        self.operations.extend_from_slice(operations);
    }

    pub fn peek(&self) -> Option<&GameOperation> {
        self.operations.last()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }

    /// Get all operations (for serialization and replay)
    pub fn operations(&self) -> &[GameOperation] {
        &self.operations
    }
}

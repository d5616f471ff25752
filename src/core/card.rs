//! Card data and presentation state

use crate::core::{CardId, CardName};
use serde::{Deserialize, Serialize};

/// Rotation of a card standing upright (attack position)
pub const ROTATION_UPRIGHT: i32 = 0;

/// Rotation of a card turned sideways (defense position)
pub const ROTATION_DEFENSE: i32 = -90;

/// Represents a card on the board
///
/// The gameplay attributes (attack, defense, level, type) are carried for
/// the presentation layer and are opaque to the engine. Only the
/// presentation state (`rotation`, `face_down`, `highlighted`, `counter`)
/// and the card's zone change during play; `id` never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique ID for this card instance
    pub id: CardId,

    /// Card name (e.g., "Dark Magician")
    pub name: CardName,

    /// Artwork reference (URL or asset key)
    #[serde(default)]
    pub image_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,

    /// Free-form card type ("monster", "spell", "trap", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,

    /// Degrees; 0 = upright/attack, -90 = defense
    #[serde(default)]
    pub rotation: i32,

    #[serde(default)]
    pub face_down: bool,

    #[serde(default)]
    pub highlighted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<u32>,
}

impl Card {
    pub fn new(id: impl Into<CardId>, name: impl Into<CardName>) -> Self {
        Card {
            id: id.into(),
            name: name.into(),
            image_url: String::new(),
            attack: None,
            defense: None,
            level: None,
            card_type: None,
            rotation: ROTATION_UPRIGHT,
            face_down: false,
            highlighted: false,
            counter: None,
        }
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    pub fn with_stats(mut self, attack: i32, defense: i32, level: u8) -> Self {
        self.attack = Some(attack);
        self.defense = Some(defense);
        self.level = Some(level);
        self
    }

    pub fn is_defense(&self) -> bool {
        self.rotation == ROTATION_DEFENSE
    }

    /// Clear orientation, face-down and counter state
    pub fn reset_presentation(&mut self) {
        self.rotation = ROTATION_UPRIGHT;
        self.face_down = false;
        self.counter = None;
    }

    /// Set the counter; values <= 0 clear it
    pub fn set_counter(&mut self, value: i32) {
        self.counter = if value > 0 { Some(value as u32) } else { None };
    }
}

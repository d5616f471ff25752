//! Board zones and the zone store
//!
//! The zone store is the only code that changes which zone holds a card.
//! Each public function takes a `GameState` by reference and returns
//! `Some(new_state)` when the board changed, or `None` when the request was
//! a no-op (missing card, full zone, occupied field zone, ...). Inputs are
//! never mutated.

use crate::core::{Card, CardId, Player, ROTATION_UPRIGHT};
use crate::game::state::{GameState, PlayerBoard};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Different zones where cards can exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneType {
    MonsterZone,
    SpellTrapZone,
    ExtraMonsterZone,
    FieldZone,
    Graveyard,
    Banished,
    ExtraDeck,
    Deck,
    Hand,
    FreeZone,
    SideFreeZone,
    SideDeck,
}

/// Structural family of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneLayout {
    /// Fixed indexed slots, each holding an ordered stack
    Slotted,
    /// At most one card
    Single,
    /// Unbounded ordered list
    List,
    /// Unbounded ordered list that strips all orientation state
    Staging,
}

impl ZoneType {
    pub const ALL: [ZoneType; 12] = [
        ZoneType::MonsterZone,
        ZoneType::SpellTrapZone,
        ZoneType::ExtraMonsterZone,
        ZoneType::FieldZone,
        ZoneType::Graveyard,
        ZoneType::Banished,
        ZoneType::ExtraDeck,
        ZoneType::Deck,
        ZoneType::Hand,
        ZoneType::FreeZone,
        ZoneType::SideFreeZone,
        ZoneType::SideDeck,
    ];

    pub fn layout(&self) -> ZoneLayout {
        match self {
            ZoneType::MonsterZone | ZoneType::SpellTrapZone | ZoneType::ExtraMonsterZone => {
                ZoneLayout::Slotted
            }
            ZoneType::FieldZone => ZoneLayout::Single,
            ZoneType::FreeZone | ZoneType::SideFreeZone => ZoneLayout::Staging,
            _ => ZoneLayout::List,
        }
    }

    pub fn is_slotted(&self) -> bool {
        self.layout() == ZoneLayout::Slotted
    }

    /// Zones where a card's counter does not survive arrival
    pub fn clears_counter(&self) -> bool {
        matches!(
            self,
            ZoneType::Hand
                | ZoneType::Deck
                | ZoneType::Graveyard
                | ZoneType::Banished
                | ZoneType::ExtraDeck
                | ZoneType::SideDeck
        )
    }

    /// Human-readable zone name
    pub fn label(&self) -> &'static str {
        match self {
            ZoneType::MonsterZone => "Monster Zone",
            ZoneType::SpellTrapZone => "Spell/Trap Zone",
            ZoneType::ExtraMonsterZone => "Extra Monster Zone",
            ZoneType::FieldZone => "Field Zone",
            ZoneType::Graveyard => "Graveyard",
            ZoneType::Banished => "Banished",
            ZoneType::ExtraDeck => "Extra Deck",
            ZoneType::Deck => "Deck",
            ZoneType::Hand => "Hand",
            ZoneType::FreeZone => "Free Zone",
            ZoneType::SideFreeZone => "Side Free Zone",
            ZoneType::SideDeck => "Side Deck",
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where to insert a card among the existing stack of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StackPosition {
    #[default]
    Top,
    Bottom,
}

/// Address of a zone, optionally narrowed to a slot and a position
///
/// `index` selects the slot of a slotted zone. `card_index` is the position
/// inside that slot's stack (0 = top) or inside an ordered list zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneId {
    pub player: Player,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_index: Option<usize>,
}

impl ZoneId {
    pub fn new(player: Player, zone_type: ZoneType) -> Self {
        ZoneId {
            player,
            zone_type,
            index: None,
            card_index: None,
        }
    }

    pub fn slot(player: Player, zone_type: ZoneType, index: usize) -> Self {
        ZoneId {
            player,
            zone_type,
            index: Some(index),
            card_index: None,
        }
    }

    pub fn at(mut self, card_index: usize) -> Self {
        self.card_index = Some(card_index);
        self
    }

    /// Same player, zone type and (for slotted zones) slot
    pub fn same_zone(&self, other: &ZoneId) -> bool {
        self.player == other.player
            && self.zone_type == other.zone_type
            && (!self.zone_type.is_slotted() || self.index == other.index)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) if self.zone_type.is_slotted() => {
                write!(f, "{} {} {}", self.player, self.zone_type, index + 1)
            }
            _ => write!(f, "{} {}", self.player, self.zone_type),
        }
    }
}

/// Add a card to a zone, following the zone's placement rules
pub fn add_card_to_zone(state: &GameState, zone: &ZoneId, card: Card) -> Option<GameState> {
    let mut next = state.clone();
    place_card(next.board_mut(zone.player), zone, card).then_some(next)
}

/// Remove a card from a zone by id
///
/// For slotted zones `stack_position` is tried first and only trusted when
/// the card at that position carries `card_id`; otherwise the slot (or
/// every slot, when no slot index is given) is searched by id.
pub fn remove_card_from_zone_by_id(
    state: &GameState,
    zone: &ZoneId,
    card_id: &CardId,
    stack_position: Option<usize>,
) -> Option<GameState> {
    let mut next = state.clone();
    take_card(next.board_mut(zone.player), zone, card_id, stack_position)?;
    Some(next)
}

/// Replace a card (matched by id) inside a zone with an updated copy
///
/// Returns `None` when the card is not in the zone or nothing changed.
pub fn update_card_in_zone(state: &GameState, zone: &ZoneId, card: Card) -> Option<GameState> {
    let mut next = state.clone();
    let slot = card_slot_mut(next.board_mut(zone.player), zone, &card.id)?;
    if *slot == card {
        return None;
    }
    *slot = card;
    Some(next)
}

/// Locate a card anywhere on the board
///
/// The returned `ZoneId` always carries `index` for slotted zones and
/// `card_index` for every zone except the field zone.
pub fn find_card<'a>(state: &'a GameState, card_id: &CardId) -> Option<(ZoneId, &'a Card)> {
    Player::ALL
        .into_iter()
        .find_map(|player| find_card_in_board(state.board(player), player, card_id))
}

/// Locate a card within one player's side of the table
pub fn find_card_in_board<'a>(
    board: &'a PlayerBoard,
    player: Player,
    card_id: &CardId,
) -> Option<(ZoneId, &'a Card)> {
    for zone_type in ZoneType::ALL {
        match zone_type.layout() {
            ZoneLayout::Slotted => {
                let slots = board.slots(zone_type)?;
                for (index, stack) in slots.iter().enumerate() {
                    if let Some(pos) = stack.iter().position(|c| &c.id == card_id) {
                        let zone = ZoneId::slot(player, zone_type, index).at(pos);
                        return Some((zone, &stack[pos]));
                    }
                }
            }
            ZoneLayout::Single => {
                if let Some(card) = board.field_zone.as_ref().filter(|c| &c.id == card_id) {
                    return Some((ZoneId::new(player, zone_type), card));
                }
            }
            ZoneLayout::List | ZoneLayout::Staging => {
                let cards = board.list(zone_type)?;
                if let Some(pos) = cards.iter().position(|c| &c.id == card_id) {
                    return Some((ZoneId::new(player, zone_type).at(pos), &cards[pos]));
                }
            }
        }
    }
    None
}

/// Place a card on a board in place. Returns `false` when the zone rejects it.
pub(crate) fn place_card(board: &mut PlayerBoard, zone: &ZoneId, mut card: Card) -> bool {
    match zone.zone_type.layout() {
        ZoneLayout::Slotted => {
            let Some(slots) = board.slots_mut(zone.zone_type) else {
                return false;
            };
            let slot = match zone.index {
                Some(index) if index < slots.len() => index,
                Some(_) => return false,
                None => match slots.iter().position(|stack| stack.is_empty()) {
                    Some(index) => index,
                    None => return false,
                },
            };
            let stack = &mut slots[slot];
            let at = zone.card_index.unwrap_or(0).min(stack.len());
            stack.insert(at, card);
            // Cards beneath the top of a pile lose their orientation and counter
            for below in stack.iter_mut().skip(1) {
                below.rotation = ROTATION_UPRIGHT;
                below.counter = None;
            }
            true
        }
        ZoneLayout::Single => {
            if board.field_zone.is_some() {
                return false;
            }
            board.field_zone = Some(card);
            true
        }
        ZoneLayout::List => {
            if zone.zone_type.clears_counter() {
                card.counter = None;
            }
            let Some(cards) = board.list_mut(zone.zone_type) else {
                return false;
            };
            match zone.card_index {
                Some(at) if at <= cards.len() => cards.insert(at, card),
                // Top of deck unless told otherwise
                _ if zone.zone_type == ZoneType::Deck => cards.insert(0, card),
                _ => cards.push(card),
            }
            true
        }
        ZoneLayout::Staging => {
            card.reset_presentation();
            let Some(cards) = board.list_mut(zone.zone_type) else {
                return false;
            };
            let at = zone.card_index.unwrap_or(cards.len()).min(cards.len());
            cards.insert(at, card);
            true
        }
    }
}

/// Remove a card from a board in place, returning it
pub(crate) fn take_card(
    board: &mut PlayerBoard,
    zone: &ZoneId,
    card_id: &CardId,
    stack_position: Option<usize>,
) -> Option<Card> {
    match zone.zone_type.layout() {
        ZoneLayout::Slotted => {
            let slots = board.slots_mut(zone.zone_type)?;
            let (slot, pos) = match zone.index {
                Some(index) => {
                    let stack = slots.get(index)?;
                    let pos = stack_position
                        .filter(|&p| stack.get(p).is_some_and(|c| &c.id == card_id))
                        .or_else(|| stack.iter().position(|c| &c.id == card_id))?;
                    (index, pos)
                }
                None => slots.iter().enumerate().find_map(|(index, stack)| {
                    stack
                        .iter()
                        .position(|c| &c.id == card_id)
                        .map(|pos| (index, pos))
                })?,
            };
            Some(slots[slot].remove(pos))
        }
        ZoneLayout::Single => {
            if board.field_zone.as_ref().is_some_and(|c| &c.id == card_id) {
                board.field_zone.take()
            } else {
                None
            }
        }
        ZoneLayout::List | ZoneLayout::Staging => {
            let cards = board.list_mut(zone.zone_type)?;
            let pos = cards.iter().position(|c| &c.id == card_id)?;
            Some(cards.remove(pos))
        }
    }
}

/// Mutable access to a card (by id) inside a zone
fn card_slot_mut<'a>(
    board: &'a mut PlayerBoard,
    zone: &ZoneId,
    card_id: &CardId,
) -> Option<&'a mut Card> {
    match zone.zone_type.layout() {
        ZoneLayout::Slotted => {
            let slots = board.slots_mut(zone.zone_type)?;
            match zone.index {
                Some(index) => slots.get_mut(index)?.iter_mut().find(|c| &c.id == card_id),
                None => slots
                    .iter_mut()
                    .flat_map(|stack| stack.iter_mut())
                    .find(|c| &c.id == card_id),
            }
        }
        ZoneLayout::Single => board.field_zone.as_mut().filter(|c| &c.id == card_id),
        ZoneLayout::List | ZoneLayout::Staging => board
            .list_mut(zone.zone_type)?
            .iter_mut()
            .find(|c| &c.id == card_id),
    }
}

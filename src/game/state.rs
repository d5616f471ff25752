//! Board state structures

use crate::core::{Card, CardId, Player};
use crate::game::Phase;
use crate::zones::ZoneType;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Number of main monster zone slots per player
pub const MONSTER_ZONE_SLOTS: usize = 5;

/// Number of spell/trap zone slots per player
pub const SPELL_TRAP_ZONE_SLOTS: usize = 5;

/// Number of extra monster zone slots
pub const EXTRA_MONSTER_ZONE_SLOTS: usize = 2;

/// Starting life points
pub const DEFAULT_LIFE_POINTS: i32 = 8000;

/// Ordered pile of cards in one slot (top = index 0)
pub type Stack = SmallVec<[Card; 2]>;

/// All zones of one side of the table
///
/// Missing fields deserialize to an empty board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerBoard {
    pub monster_zones: Vec<Stack>,
    pub spell_trap_zones: Vec<Stack>,
    pub extra_monster_zones: Vec<Stack>,

    /// Single field spell, no stacking
    pub field_zone: Option<Card>,

    pub graveyard: Vec<Card>,
    pub banished: Vec<Card>,
    pub extra_deck: Vec<Card>,

    /// Index 0 is the top of the deck
    pub deck: Vec<Card>,

    pub hand: Vec<Card>,
    pub free_zone: Vec<Card>,
    pub side_free_zone: Vec<Card>,
    pub side_deck: Vec<Card>,

    pub life_points: i32,
}

impl PlayerBoard {
    pub fn new(life_points: i32) -> Self {
        PlayerBoard {
            monster_zones: vec![Stack::new(); MONSTER_ZONE_SLOTS],
            spell_trap_zones: vec![Stack::new(); SPELL_TRAP_ZONE_SLOTS],
            extra_monster_zones: vec![Stack::new(); EXTRA_MONSTER_ZONE_SLOTS],
            field_zone: None,
            graveyard: Vec::new(),
            banished: Vec::new(),
            extra_deck: Vec::new(),
            deck: Vec::new(),
            hand: Vec::new(),
            free_zone: Vec::new(),
            side_free_zone: Vec::new(),
            side_deck: Vec::new(),
            life_points,
        }
    }

    /// Slots of a slotted zone (monster, spell/trap, extra monster)
    pub fn slots(&self, zone: ZoneType) -> Option<&[Stack]> {
        match zone {
            ZoneType::MonsterZone => Some(&self.monster_zones),
            ZoneType::SpellTrapZone => Some(&self.spell_trap_zones),
            ZoneType::ExtraMonsterZone => Some(&self.extra_monster_zones),
            _ => None,
        }
    }

    pub fn slots_mut(&mut self, zone: ZoneType) -> Option<&mut Vec<Stack>> {
        match zone {
            ZoneType::MonsterZone => Some(&mut self.monster_zones),
            ZoneType::SpellTrapZone => Some(&mut self.spell_trap_zones),
            ZoneType::ExtraMonsterZone => Some(&mut self.extra_monster_zones),
            _ => None,
        }
    }

    /// Cards of an ordered list zone (hand, deck, graveyard, ...)
    pub fn list(&self, zone: ZoneType) -> Option<&Vec<Card>> {
        match zone {
            ZoneType::Graveyard => Some(&self.graveyard),
            ZoneType::Banished => Some(&self.banished),
            ZoneType::ExtraDeck => Some(&self.extra_deck),
            ZoneType::Deck => Some(&self.deck),
            ZoneType::Hand => Some(&self.hand),
            ZoneType::FreeZone => Some(&self.free_zone),
            ZoneType::SideFreeZone => Some(&self.side_free_zone),
            ZoneType::SideDeck => Some(&self.side_deck),
            _ => None,
        }
    }

    pub fn list_mut(&mut self, zone: ZoneType) -> Option<&mut Vec<Card>> {
        match zone {
            ZoneType::Graveyard => Some(&mut self.graveyard),
            ZoneType::Banished => Some(&mut self.banished),
            ZoneType::ExtraDeck => Some(&mut self.extra_deck),
            ZoneType::Deck => Some(&mut self.deck),
            ZoneType::Hand => Some(&mut self.hand),
            ZoneType::FreeZone => Some(&mut self.free_zone),
            ZoneType::SideFreeZone => Some(&mut self.side_free_zone),
            ZoneType::SideDeck => Some(&mut self.side_deck),
            _ => None,
        }
    }

    /// Iterate over every card on this side of the table
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.monster_zones
            .iter()
            .chain(self.spell_trap_zones.iter())
            .chain(self.extra_monster_zones.iter())
            .flat_map(|stack| stack.iter())
            .chain(self.field_zone.iter())
            .chain(self.graveyard.iter())
            .chain(self.banished.iter())
            .chain(self.extra_deck.iter())
            .chain(self.deck.iter())
            .chain(self.hand.iter())
            .chain(self.free_zone.iter())
            .chain(self.side_free_zone.iter())
            .chain(self.side_deck.iter())
    }

    pub fn card_count(&self) -> usize {
        self.cards().count()
    }
}

impl Default for PlayerBoard {
    fn default() -> Self {
        Self::new(DEFAULT_LIFE_POINTS)
    }
}

/// Both sides of the table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Players {
    #[serde(rename = "self")]
    pub myself: PlayerBoard,
    pub opponent: PlayerBoard,
}

/// Complete board snapshot
///
/// A plain value: every transition returns a new `GameState` and never
/// mutates its input, so snapshots can be stored in the history as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub players: Players,
    pub turn: u32,
    pub phase: Phase,
    pub current_player: Player,
}

impl GameState {
    /// Create an empty board with the given starting life points
    pub fn new(starting_life: i32) -> Self {
        GameState {
            players: Players {
                myself: PlayerBoard::new(starting_life),
                opponent: PlayerBoard::new(starting_life),
            },
            turn: 1,
            phase: Phase::default(),
            current_player: Player::Myself,
        }
    }

    /// Seed a player's deck and extra deck (deck-loading collaborator)
    pub fn with_deck(mut self, player: Player, deck: Vec<Card>, extra_deck: Vec<Card>) -> Self {
        let board = self.board_mut(player);
        board.deck = deck;
        board.extra_deck = extra_deck;
        self
    }

    pub fn board(&self, player: Player) -> &PlayerBoard {
        match player {
            Player::Myself => &self.players.myself,
            Player::Opponent => &self.players.opponent,
        }
    }

    pub fn board_mut(&mut self, player: Player) -> &mut PlayerBoard {
        match player {
            Player::Myself => &mut self.players.myself,
            Player::Opponent => &mut self.players.opponent,
        }
    }

    /// Iterate over every card in the game
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.players.myself.cards().chain(self.players.opponent.cards())
    }

    pub fn contains_card(&self, card_id: &CardId) -> bool {
        self.cards().any(|card| &card.id == card_id)
    }

    pub fn card_count(&self) -> usize {
        self.cards().count()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_LIFE_POINTS)
    }
}

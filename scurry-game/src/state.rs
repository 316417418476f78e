//! Authoritative game state for one pursuit duel.
//!
//! `GameState` is a plain data model: every rule that mutates it lives in
//! the turn engine. The state is serde-serializable end to end so the
//! presentation layer can snapshot it and tests can compare frozen states
//! for exact equality.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::config::GameConfig;
use crate::constants::{BALLOON_CHARGES_START, BANANA_CHARGES_START, BROOM_CHARGES_START};
use crate::event::{Event, EventId, EventKind, EventLog};

/// Armed trap positions, stored inline; the stock budget is three.
pub type TrapSet = SmallVec<[u8; 4]>;

/// The side currently authorized to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TurnOwner {
    #[default]
    Mouse,
    Cat,
}

impl TurnOwner {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mouse => "mouse",
            Self::Cat => "cat",
        }
    }

    /// The side that acts after this one.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Mouse => Self::Cat,
            Self::Cat => Self::Mouse,
        }
    }
}

impl fmt::Display for TurnOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TurnOwner {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mouse" => Ok(Self::Mouse),
            "cat" => Ok(Self::Cat),
            _ => Err(()),
        }
    }
}

/// Which terminal condition ended the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// Mouse returned to the hole carrying the cheese.
    MouseVictory,
    /// Mouse health reached zero.
    CatVictory,
}

impl Ending {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MouseVictory => "mouse_victory",
            Self::CatVictory => "cat_victory",
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Board geometry and budgets this game was created with; the
    /// presentation layer renders the track from these.
    pub config: GameConfig,
    pub mouse_pos: u8,
    pub cat_pos: u8,
    pub mouse_hp: i32,
    /// Tracked for forward compatibility; no current action reduces it.
    pub cat_hp: i32,
    #[serde(default)]
    pub has_cheese: bool,
    #[serde(default)]
    pub traps: TrapSet,
    #[serde(default)]
    pub traps_remaining: u8,
    #[serde(default)]
    pub balloon_charges: u8,
    #[serde(default)]
    pub banana_charges: u8,
    #[serde(default)]
    pub broom_charges: u8,
    #[serde(default)]
    pub banana_pos: Option<u8>,
    #[serde(default)]
    pub cat_skip_next_turn: bool,
    #[serde(default)]
    pub cat_broom_active: bool,
    #[serde(default)]
    pub turn: TurnOwner,
    /// One-based round counter; bumps each time the turn returns to Mouse.
    #[serde(default = "default_round")]
    pub round: u32,
    #[serde(default)]
    event_seq: u16,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub ending: Option<Ending>,
    #[serde(default)]
    pub events: EventLog,
}

fn default_round() -> u32 {
    1
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

impl GameState {
    /// Build a fully initialized state for the given board.
    ///
    /// Mouse starts in the hole, Cat on the far end of the track.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            config: *config,
            mouse_pos: config.hole_pos,
            cat_pos: config.last_cell(),
            mouse_hp: config.max_mouse_hp,
            cat_hp: config.max_cat_hp,
            has_cheese: false,
            traps: TrapSet::new(),
            traps_remaining: config.max_traps,
            balloon_charges: BALLOON_CHARGES_START,
            banana_charges: BANANA_CHARGES_START,
            broom_charges: BROOM_CHARGES_START,
            banana_pos: None,
            cat_skip_next_turn: false,
            cat_broom_active: false,
            turn: TurnOwner::Mouse,
            round: 1,
            event_seq: 0,
            game_over: false,
            ending: None,
            events: EventLog::new(),
        }
    }

    /// Whether a trap is armed on the given cell.
    #[must_use]
    pub fn trap_at(&self, pos: u8) -> bool {
        self.traps.contains(&pos)
    }

    pub(crate) fn arm_trap(&mut self, pos: u8) {
        if !self.trap_at(pos) {
            self.traps.push(pos);
        }
    }

    pub(crate) fn disarm_trap(&mut self, pos: u8) {
        self.traps.retain(|&mut armed| armed != pos);
    }

    /// Append an event, stamping the next stable id for the current round.
    pub(crate) fn emit(&mut self, kind: EventKind, message: String) -> EventId {
        self.emit_with_payload(kind, message, serde_json::Value::Null)
    }

    pub(crate) fn emit_with_payload(
        &mut self,
        kind: EventKind,
        message: String,
        payload: serde_json::Value,
    ) -> EventId {
        let id = EventId::new(self.round, self.event_seq);
        self.event_seq = self.event_seq.saturating_add(1);
        self.events
            .record(Event::new(id, kind, message).with_payload(payload));
        id
    }

    /// Hand the turn to the given side; the round advances when ownership
    /// returns to Mouse.
    pub(crate) fn pass_turn_to(&mut self, side: TurnOwner) {
        self.turn = side;
        if side == TurnOwner::Mouse {
            self.round = self.round.saturating_add(1);
            self.event_seq = 0;
        }
    }

    pub(crate) fn finish(&mut self, ending: Ending) {
        self.game_over = true;
        self.ending = Some(ending);
    }

    /// Whether the game has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.game_over
    }
}

//! High-level session binding the turn engine to a mutable game state.

use crate::config::{ConfigError, GameConfig};
use crate::dice::{DieRoller, SeededDice};
use crate::engine::{ActionOutcome, EngineError, TurnEngine};
use crate::event::EventLog;
use crate::state::GameState;

/// One running game: the engine plus the state it drives.
///
/// This is the surface the presentation layer talks to - it reads
/// [`GameSession::state`] to render and dispatches exactly one command per
/// turn for the side that owns it.
#[derive(Debug, Clone)]
pub struct GameSession<D> {
    engine: TurnEngine<D>,
    state: GameState,
}

impl<D: DieRoller> GameSession<D> {
    /// Construct a fresh session over a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration violates its bounds.
    pub fn new(cfg: GameConfig, dice: D) -> Result<Self, ConfigError> {
        let engine = TurnEngine::new(cfg, dice)?;
        let state = engine.new_state();
        Ok(Self { engine, state })
    }

    /// Borrow the underlying immutable game state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Borrow the underlying mutable game state.
    pub const fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Apply a closure to the mutable game state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.state)
    }

    /// Borrow the engine.
    #[must_use]
    pub const fn engine(&self) -> &TurnEngine<D> {
        &self.engine
    }

    /// The game log, newest-first.
    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.state.events
    }

    /// Consume the session, returning the underlying game state.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Discard the current game and start over on the same board.
    pub fn reset(&mut self) {
        self.engine.reset(&mut self.state);
    }

    // === Commands ===

    /// # Errors
    ///
    /// See [`TurnEngine::mouse_roll_and_move`].
    pub fn mouse_roll_and_move(&mut self, auto_evade: bool) -> Result<ActionOutcome, EngineError> {
        self.engine.mouse_roll_and_move(&mut self.state, auto_evade)
    }

    /// # Errors
    ///
    /// See [`TurnEngine::mouse_use_balloon`].
    pub fn mouse_use_balloon(&mut self, auto_evade: bool) -> Result<ActionOutcome, EngineError> {
        self.engine.mouse_use_balloon(&mut self.state, auto_evade)
    }

    /// # Errors
    ///
    /// See [`TurnEngine::mouse_drop_banana`].
    pub fn mouse_drop_banana(&mut self) -> Result<ActionOutcome, EngineError> {
        self.engine.mouse_drop_banana(&mut self.state)
    }

    /// # Errors
    ///
    /// See [`TurnEngine::cat_roll_and_chase`].
    pub fn cat_roll_and_chase(&mut self) -> Result<ActionOutcome, EngineError> {
        self.engine.cat_roll_and_chase(&mut self.state)
    }

    /// # Errors
    ///
    /// See [`TurnEngine::cat_place_trap`].
    pub fn cat_place_trap(&mut self) -> Result<ActionOutcome, EngineError> {
        self.engine.cat_place_trap(&mut self.state)
    }

    /// # Errors
    ///
    /// See [`TurnEngine::cat_use_broom`].
    pub fn cat_use_broom(&mut self) -> Result<ActionOutcome, EngineError> {
        self.engine.cat_use_broom(&mut self.state)
    }
}

impl GameSession<SeededDice> {
    /// Convenience constructor wiring the production seeded dice.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration violates its bounds.
    pub fn from_seed(cfg: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(cfg, SeededDice::from_user_seed(seed))
    }
}

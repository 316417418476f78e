//! Scurry Game Engine
//!
//! Platform-agnostic core game logic for Scurry, a turn-based cat-and-mouse
//! pursuit duel on a one-dimensional track. This crate provides all game
//! mechanics without UI or platform-specific dependencies: the presentation
//! layer renders from [`GameState`] snapshots and dispatches one command per
//! turn through [`GameSession`].
//!
//! The rules in brief: Mouse starts in the hole, must reach the cheese and
//! carry it back home; Cat chases, swats, and sets mousetraps. Both sides
//! move by die rolls drawn from an injected [`DieRoller`], so a fixed seed
//! reproduces a complete game transcript.

pub mod config;
pub mod constants;
pub mod dice;
pub mod engine;
pub mod event;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig};
pub use dice::{DieRoller, ScriptedDice, SeededDice};
pub use engine::{ActionOutcome, EngineError, ItemKind, TurnEngine};
pub use event::{Event, EventId, EventKind, EventLog, EventSeverity};
pub use session::GameSession;
pub use state::{Ending, GameState, TrapSet, TurnOwner};

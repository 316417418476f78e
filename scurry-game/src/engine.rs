//! Turn resolution rules for the pursuit duel.
//!
//! The engine owns the validated board configuration and the dice port;
//! every command checks its preconditions, draws its own rolls, mutates the
//! state, and reports the freshly appended events. A rejected command
//! leaves the state untouched.

use serde_json::json;
use std::fmt;
use thiserror::Error;

use crate::config::{ConfigError, GameConfig};
use crate::constants::{BALLOON_BONUS_STEPS, CAT_ATTACK_RANGE, CAT_BROOM_ATTACK_RANGE};
use crate::dice::DieRoller;
use crate::event::{Event, EventKind};
use crate::state::{Ending, GameState, TurnOwner};

/// Consumable items and budgets an action may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Balloon,
    Banana,
    Broom,
    Trap,
}

impl ItemKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balloon => "balloon",
            Self::Banana => "banana",
            Self::Broom => "broom",
            Self::Trap => "trap",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-input errors; the engine rejects these without mutating state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("it is {actual}'s turn, not {expected}'s")]
    OutOfTurn {
        expected: TurnOwner,
        actual: TurnOwner,
    },
    #[error("the game is over; only reset is accepted")]
    GameOver,
    #[error("no {item} charges left")]
    Exhausted { item: ItemKind },
}

/// Result of one accepted command.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// Whether the game reached a terminal state during this command.
    pub ended: bool,
    /// Events appended by this command, in chronological order.
    pub events: Vec<Event>,
}

/// All rules of the duel, bound to a validated board and a dice port.
#[derive(Debug, Clone)]
pub struct TurnEngine<D> {
    cfg: GameConfig,
    dice: D,
}

impl<D: DieRoller> TurnEngine<D> {
    /// Build an engine over a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration violates its bounds.
    pub fn new(cfg: GameConfig, dice: D) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self { cfg, dice })
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn dice(&self) -> &D {
        &self.dice
    }

    /// Fresh state for this engine's board.
    #[must_use]
    pub fn new_state(&self) -> GameState {
        GameState::new(&self.cfg)
    }

    /// Discard the current game and start over on the same board.
    pub fn reset(&self, state: &mut GameState) {
        *state = GameState::new(&self.cfg);
    }

    // === Mouse actions ===

    /// Roll the die and move: toward the cheese while empty-handed, back
    /// toward the hole once the cheese is carried.
    ///
    /// # Errors
    ///
    /// Rejects when it is not Mouse's turn or the game is over.
    pub fn mouse_roll_and_move(
        &mut self,
        state: &mut GameState,
        auto_evade: bool,
    ) -> Result<ActionOutcome, EngineError> {
        Self::expect_turn(state, TurnOwner::Mouse)?;
        let mark = state.events.len();
        let steps = self.dice.roll(TurnOwner::Mouse);
        self.resolve_mouse_move(state, steps, auto_evade);
        Self::hand_over_if_live(state);
        Ok(Self::outcome_since(state, mark))
    }

    /// Spend the balloon: a fresh roll plus two bonus steps, then the
    /// normal movement resolution.
    ///
    /// The trap check inside the movement sees the already-spent balloon,
    /// so a single balloon cannot both boost and evade.
    ///
    /// # Errors
    ///
    /// Rejects out-of-turn calls and an empty balloon charge.
    pub fn mouse_use_balloon(
        &mut self,
        state: &mut GameState,
        auto_evade: bool,
    ) -> Result<ActionOutcome, EngineError> {
        Self::expect_turn(state, TurnOwner::Mouse)?;
        if state.balloon_charges == 0 {
            return Err(EngineError::Exhausted {
                item: ItemKind::Balloon,
            });
        }
        let mark = state.events.len();
        state.balloon_charges -= 1;
        let steps = self.dice.roll(TurnOwner::Mouse) + BALLOON_BONUS_STEPS;
        state.emit_with_payload(
            EventKind::BalloonBoost,
            format!("mouse rides the balloon: {steps} steps this turn"),
            json!({ "steps": steps }),
        );
        self.resolve_mouse_move(state, steps, auto_evade);
        Self::hand_over_if_live(state);
        Ok(Self::outcome_since(state, mark))
    }

    /// Drop a banana peel on the mouse's current cell. Free action: the
    /// turn stays with Mouse.
    ///
    /// # Errors
    ///
    /// Rejects out-of-turn calls and an empty banana charge.
    pub fn mouse_drop_banana(&mut self, state: &mut GameState) -> Result<ActionOutcome, EngineError> {
        Self::expect_turn(state, TurnOwner::Mouse)?;
        if state.banana_charges == 0 {
            return Err(EngineError::Exhausted {
                item: ItemKind::Banana,
            });
        }
        let mark = state.events.len();
        state.banana_charges -= 1;
        let pos = state.mouse_pos;
        state.banana_pos = Some(pos);
        state.emit_with_payload(
            EventKind::BananaDropped,
            format!("mouse drops a banana peel on cell {pos}"),
            json!({ "pos": pos }),
        );
        Ok(Self::outcome_since(state, mark))
    }

    // === Cat actions ===

    /// Roll the die and chase the mouse. A pending banana skip consumes
    /// the whole turn instead.
    ///
    /// # Errors
    ///
    /// Rejects when it is not Cat's turn or the game is over.
    pub fn cat_roll_and_chase(&mut self, state: &mut GameState) -> Result<ActionOutcome, EngineError> {
        Self::expect_turn(state, TurnOwner::Cat)?;
        let mark = state.events.len();
        if Self::resolve_pending_skip(state) {
            return Ok(Self::outcome_since(state, mark));
        }
        let steps = self.dice.roll(TurnOwner::Cat);
        self.resolve_cat_move(state, steps);
        Self::hand_over_if_live(state);
        Ok(Self::outcome_since(state, mark))
    }

    /// Set a mousetrap on the next cell toward the mouse. Free action while
    /// the placement budget lasts; a duplicate cell is an informational
    /// no-op that spends nothing.
    ///
    /// # Errors
    ///
    /// Rejects out-of-turn calls and an exhausted placement budget.
    pub fn cat_place_trap(&mut self, state: &mut GameState) -> Result<ActionOutcome, EngineError> {
        Self::expect_turn(state, TurnOwner::Cat)?;
        let mark = state.events.len();
        if Self::resolve_pending_skip(state) {
            return Ok(Self::outcome_since(state, mark));
        }
        if state.traps_remaining == 0 {
            return Err(EngineError::Exhausted {
                item: ItemKind::Trap,
            });
        }
        let pos = if state.cat_pos > state.mouse_pos {
            state.cat_pos.saturating_sub(1)
        } else {
            state.cat_pos.saturating_add(1).min(self.cfg.last_cell())
        };
        if state.trap_at(pos) {
            state.emit(
                EventKind::TrapRefused,
                format!("a trap is already set on cell {pos}"),
            );
        } else {
            state.arm_trap(pos);
            state.traps_remaining -= 1;
            state.emit_with_payload(
                EventKind::TrapSet,
                format!("cat sets a mousetrap on cell {pos}"),
                json!({ "pos": pos, "remaining": state.traps_remaining }),
            );
        }
        Ok(Self::outcome_since(state, mark))
    }

    /// Spend the broom: widened attack range for this turn's chase, which
    /// runs immediately.
    ///
    /// # Errors
    ///
    /// Rejects out-of-turn calls and an empty broom charge.
    pub fn cat_use_broom(&mut self, state: &mut GameState) -> Result<ActionOutcome, EngineError> {
        Self::expect_turn(state, TurnOwner::Cat)?;
        let mark = state.events.len();
        if Self::resolve_pending_skip(state) {
            return Ok(Self::outcome_since(state, mark));
        }
        if state.broom_charges == 0 {
            return Err(EngineError::Exhausted {
                item: ItemKind::Broom,
            });
        }
        state.broom_charges -= 1;
        state.cat_broom_active = true;
        state.emit(
            EventKind::BroomSwing,
            String::from("cat swings the broom: attack range widens this turn"),
        );
        let steps = self.dice.roll(TurnOwner::Cat);
        self.resolve_cat_move(state, steps);
        Self::hand_over_if_live(state);
        Ok(Self::outcome_since(state, mark))
    }

    // === Shared resolution sequences ===

    /// Movement, trap, cheese-pickup, and win resolution, in that order.
    /// The win check always runs last.
    fn resolve_mouse_move(&mut self, state: &mut GameState, steps: u8, auto_evade: bool) {
        let from = state.mouse_pos;
        let target = if state.has_cheese {
            from.saturating_sub(steps).max(self.cfg.hole_pos)
        } else {
            from.saturating_add(steps).min(self.cfg.last_cell())
        };
        state.mouse_pos = target;
        state.emit_with_payload(
            EventKind::MouseMoved,
            format!("mouse moved {from} -> {target} ({steps} steps)"),
            json!({ "from": from, "to": target, "steps": steps }),
        );

        if state.trap_at(target) {
            if state.balloon_charges > 0 && auto_evade {
                state.balloon_charges -= 1;
                state.disarm_trap(target);
                state.emit(
                    EventKind::TrapEvaded,
                    format!("mouse floats over the trap on cell {target} with a balloon"),
                );
            } else {
                state.mouse_hp = (state.mouse_hp - 1).max(0);
                state.emit_with_payload(
                    EventKind::TrapSprung,
                    format!("mouse stepped on a trap! -1 hp ({} left)", state.mouse_hp),
                    json!({ "pos": target, "hp": state.mouse_hp }),
                );
            }
        }

        if !state.has_cheese && target == self.cfg.cheese_pos {
            state.has_cheese = true;
            state.emit(
                EventKind::CheeseClaimed,
                String::from("mouse grabs the cheese and bolts for the hole"),
            );
        }

        if state.has_cheese && state.mouse_pos == self.cfg.hole_pos {
            state.finish(Ending::MouseVictory);
            state.emit_with_payload(
                EventKind::MouseEscaped,
                String::from("mouse makes it home with the cheese: mouse wins"),
                json!({ "ending": Ending::MouseVictory.key() }),
            );
        }
    }

    /// Movement, banana, attack, broom reset, and loss resolution, in that
    /// order. The loss check runs even when the attack misses, so trap
    /// damage from earlier turns can end the game here.
    fn resolve_cat_move(&mut self, state: &mut GameState, steps: u8) {
        let from = state.cat_pos;
        let target = if from > state.mouse_pos {
            from.saturating_sub(steps)
        } else {
            from.saturating_add(steps).min(self.cfg.last_cell())
        };
        state.cat_pos = target;
        state.emit_with_payload(
            EventKind::CatMoved,
            format!("cat moved {from} -> {target} ({steps} steps)"),
            json!({ "from": from, "to": target, "steps": steps }),
        );

        if state.banana_pos == Some(target) {
            state.cat_skip_next_turn = true;
            state.banana_pos = None;
            state.emit(
                EventKind::BananaSlip,
                String::from("cat slips on the banana peel and will skip the next turn"),
            );
        }

        let distance = state.cat_pos.abs_diff(state.mouse_pos);
        let range = if state.cat_broom_active {
            CAT_BROOM_ATTACK_RANGE
        } else {
            CAT_ATTACK_RANGE
        };
        if distance <= range {
            state.mouse_hp = (state.mouse_hp - 1).max(0);
            state.emit_with_payload(
                EventKind::CatAttack,
                format!("cat swats the mouse! -1 hp ({} left)", state.mouse_hp),
                json!({ "distance": distance, "range": range, "hp": state.mouse_hp }),
            );
        }

        state.cat_broom_active = false;

        if state.mouse_hp <= 0 {
            state.finish(Ending::CatVictory);
            state.emit_with_payload(
                EventKind::MouseDown,
                String::from("mouse is out of hp: cat wins"),
                json!({ "ending": Ending::CatVictory.key() }),
            );
        }
    }

    /// Consume a pending banana skip; the skip is the whole Cat turn, no
    /// matter which action was attempted.
    fn resolve_pending_skip(state: &mut GameState) -> bool {
        if !state.cat_skip_next_turn {
            return false;
        }
        state.cat_skip_next_turn = false;
        state.emit(
            EventKind::CatTurnSkipped,
            String::from("cat is still untangling from the banana peel and skips the turn"),
        );
        state.pass_turn_to(state.turn.opponent());
        true
    }

    fn expect_turn(state: &GameState, expected: TurnOwner) -> Result<(), EngineError> {
        if state.game_over {
            return Err(EngineError::GameOver);
        }
        if state.turn != expected {
            return Err(EngineError::OutOfTurn {
                expected,
                actual: state.turn,
            });
        }
        Ok(())
    }

    fn hand_over_if_live(state: &mut GameState) {
        if !state.game_over {
            state.pass_turn_to(state.turn.opponent());
        }
    }

    fn outcome_since(state: &GameState, mark: usize) -> ActionOutcome {
        let fresh = state.events.len() - mark;
        let mut events: Vec<Event> = state.events.iter().take(fresh).cloned().collect();
        events.reverse();
        ActionOutcome {
            ended: state.game_over,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    fn engine(rolls: impl IntoIterator<Item = u8>) -> TurnEngine<ScriptedDice> {
        TurnEngine::new(GameConfig::default(), ScriptedDice::from_rolls(rolls))
            .expect("default config is valid")
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = GameConfig {
            track_len: 2,
            ..GameConfig::default()
        };
        assert!(TurnEngine::new(cfg, ScriptedDice::default()).is_err());
    }

    #[test]
    fn cat_action_on_mouse_turn_leaves_state_untouched() {
        let mut engine = engine([3]);
        let mut state = engine.new_state();
        let before = state.clone();

        let err = engine.cat_roll_and_chase(&mut state).unwrap_err();
        assert_eq!(
            err,
            EngineError::OutOfTurn {
                expected: TurnOwner::Cat,
                actual: TurnOwner::Mouse,
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn exhausted_banana_is_rejected_without_mutation() {
        let mut engine = engine([]);
        let mut state = engine.new_state();
        state.banana_charges = 0;
        let before = state.clone();

        let err = engine.mouse_drop_banana(&mut state).unwrap_err();
        assert_eq!(
            err,
            EngineError::Exhausted {
                item: ItemKind::Banana,
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn every_command_is_frozen_after_game_over() {
        let mut engine = engine([1, 1]);
        let mut state = engine.new_state();
        state.game_over = true;
        state.ending = Some(Ending::CatVictory);
        let before = state.clone();

        assert_eq!(
            engine.mouse_roll_and_move(&mut state, true),
            Err(EngineError::GameOver)
        );
        assert_eq!(
            engine.mouse_use_balloon(&mut state, true),
            Err(EngineError::GameOver)
        );
        assert_eq!(engine.mouse_drop_banana(&mut state), Err(EngineError::GameOver));
        assert_eq!(engine.cat_roll_and_chase(&mut state), Err(EngineError::GameOver));
        assert_eq!(engine.cat_place_trap(&mut state), Err(EngineError::GameOver));
        assert_eq!(engine.cat_use_broom(&mut state), Err(EngineError::GameOver));
        assert_eq!(state, before);
    }

    #[test]
    fn pending_skip_consumes_any_cat_command() {
        let mut engine = engine([]);
        let mut state = engine.new_state();
        state.turn = TurnOwner::Cat;
        state.cat_skip_next_turn = true;
        let traps_before = state.traps_remaining;

        let outcome = engine.cat_place_trap(&mut state).expect("skip resolves");
        assert!(!outcome.ended);
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].kind, EventKind::CatTurnSkipped);
        assert!(!state.cat_skip_next_turn);
        assert_eq!(state.turn, TurnOwner::Mouse);
        assert_eq!(state.traps_remaining, traps_before);
    }

    #[test]
    fn duplicate_trap_placement_spends_no_charge() {
        let mut engine = engine([]);
        let mut state = engine.new_state();
        state.turn = TurnOwner::Cat;
        state.cat_pos = 6;
        state.mouse_pos = 2;

        let first = engine.cat_place_trap(&mut state).expect("placement");
        assert_eq!(first.events[0].kind, EventKind::TrapSet);
        assert!(state.trap_at(5));
        assert_eq!(state.traps_remaining, 2);
        assert_eq!(state.turn, TurnOwner::Cat, "placing a trap is a free action");

        let second = engine.cat_place_trap(&mut state).expect("duplicate is a no-op");
        assert_eq!(second.events[0].kind, EventKind::TrapRefused);
        assert_eq!(state.traps_remaining, 2);
        assert_eq!(state.traps.len(), 1);
    }

    #[test]
    fn trap_placement_clamps_to_track_edges() {
        let mut engine = engine([]);
        let mut state = engine.new_state();
        state.turn = TurnOwner::Cat;
        state.cat_pos = 9;
        state.mouse_pos = 9;

        // Cat not past the mouse, so the trap goes one cell up, clamped.
        let outcome = engine.cat_place_trap(&mut state).expect("placement");
        assert_eq!(outcome.events[0].kind, EventKind::TrapSet);
        assert!(state.trap_at(9));
    }

    #[test]
    fn balloon_cannot_boost_and_evade_with_one_charge() {
        let mut engine = engine([2]);
        let mut state = engine.new_state();
        state.mouse_pos = 0;
        state.arm_trap(4);

        // Boosted roll 2 + 2 lands exactly on the trap; the single balloon
        // charge was already spent on the boost.
        let outcome = engine
            .mouse_use_balloon(&mut state, true)
            .expect("balloon move");
        assert_eq!(state.mouse_pos, 4);
        assert_eq!(state.mouse_hp, 2);
        assert!(state.trap_at(4), "trap stays armed after springing");
        assert!(
            outcome
                .events
                .iter()
                .any(|event| event.kind == EventKind::TrapSprung)
        );
        assert_eq!(state.balloon_charges, 0);
    }

    #[test]
    fn trap_damage_can_end_the_game_on_a_missed_attack() {
        let mut engine = engine([1]);
        let mut state = engine.new_state();
        state.turn = TurnOwner::Cat;
        state.mouse_hp = 0;
        state.cat_pos = 9;
        state.mouse_pos = 0;

        let outcome = engine.cat_roll_and_chase(&mut state).expect("chase");
        assert!(outcome.ended);
        assert_eq!(state.ending, Some(Ending::CatVictory));
        assert!(
            !outcome
                .events
                .iter()
                .any(|event| event.kind == EventKind::CatAttack),
            "the attack missed; the loss check alone ended the game"
        );
    }

    #[test]
    fn reset_rebuilds_the_board_and_clears_game_over() {
        let mut engine = engine([3]);
        let mut state = engine.new_state();
        let _ = engine.mouse_roll_and_move(&mut state, true).expect("move");
        state.game_over = true;

        engine.reset(&mut state);
        assert_eq!(state, engine.new_state());
        assert!(!state.game_over);
    }

    #[test]
    fn outcome_reports_events_in_chronological_order() {
        let mut engine = engine([1]);
        let mut state = engine.new_state();
        state.mouse_pos = 4; // roll 1 lands on the cheese

        let outcome = engine.mouse_roll_and_move(&mut state, true).expect("move");
        let kinds: Vec<EventKind> = outcome.events.iter().map(|event| event.kind).collect();
        assert_eq!(kinds, vec![EventKind::MouseMoved, EventKind::CheeseClaimed]);
    }
}

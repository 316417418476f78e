//! Game setup configuration and its validation rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CAT_HP_DEFAULT, CHEESE_POS_DEFAULT, HOLE_POS_DEFAULT, MAX_TRAPS_DEFAULT, MOUSE_HP_DEFAULT,
    TRACK_LEN_DEFAULT, TRACK_LEN_MAX, TRACK_LEN_MIN,
};

/// Per-game configuration accepted when a session is created.
///
/// Every field carries a serde default so partial JSON setups resolve to
/// the stock board. Validation runs before a session accepts the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_track_len")]
    pub track_len: u8,
    #[serde(default = "GameConfig::default_cheese_pos")]
    pub cheese_pos: u8,
    #[serde(default = "GameConfig::default_hole_pos")]
    pub hole_pos: u8,
    #[serde(default = "GameConfig::default_max_mouse_hp")]
    pub max_mouse_hp: i32,
    #[serde(default = "GameConfig::default_max_cat_hp")]
    pub max_cat_hp: i32,
    #[serde(default = "GameConfig::default_max_traps")]
    pub max_traps: u8,
}

impl GameConfig {
    const fn default_track_len() -> u8 {
        TRACK_LEN_DEFAULT
    }

    const fn default_cheese_pos() -> u8 {
        CHEESE_POS_DEFAULT
    }

    const fn default_hole_pos() -> u8 {
        HOLE_POS_DEFAULT
    }

    const fn default_max_mouse_hp() -> i32 {
        MOUSE_HP_DEFAULT
    }

    const fn default_max_cat_hp() -> i32 {
        CAT_HP_DEFAULT
    }

    const fn default_max_traps() -> u8 {
        MAX_TRAPS_DEFAULT
    }

    /// Index of the last track cell.
    #[must_use]
    pub const fn last_cell(&self) -> u8 {
        self.track_len - 1
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.track_len < TRACK_LEN_MIN || self.track_len > TRACK_LEN_MAX {
            return Err(ConfigError::TrackLength {
                min: TRACK_LEN_MIN,
                max: TRACK_LEN_MAX,
                value: self.track_len,
            });
        }
        if self.cheese_pos == 0 || self.cheese_pos >= self.last_cell() {
            return Err(ConfigError::CheeseOutOfBounds {
                pos: self.cheese_pos,
                len: self.track_len,
            });
        }
        if self.hole_pos >= self.cheese_pos {
            return Err(ConfigError::HoleBeyondCheese {
                hole: self.hole_pos,
                cheese: self.cheese_pos,
            });
        }
        if self.max_mouse_hp < 1 {
            return Err(ConfigError::HealthFloor {
                field: "max_mouse_hp",
                value: self.max_mouse_hp,
            });
        }
        if self.max_cat_hp < 1 {
            return Err(ConfigError::HealthFloor {
                field: "max_cat_hp",
                value: self.max_cat_hp,
            });
        }
        if self.max_traps > self.track_len {
            return Err(ConfigError::TrapBudget {
                budget: self.max_traps,
                len: self.track_len,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            track_len: Self::default_track_len(),
            cheese_pos: Self::default_cheese_pos(),
            hole_pos: Self::default_hole_pos(),
            max_mouse_hp: Self::default_max_mouse_hp(),
            max_cat_hp: Self::default_max_cat_hp(),
            max_traps: Self::default_max_traps(),
        }
    }
}

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("track length must be between {min} and {max} (got {value})")]
    TrackLength { min: u8, max: u8, value: u8 },
    #[error("cheese must sit strictly inside the track (pos {pos}, length {len})")]
    CheeseOutOfBounds { pos: u8, len: u8 },
    #[error("hole {hole} must lie before the cheese {cheese}")]
    HoleBeyondCheese { hole: u8, cheese: u8 },
    #[error("{field} must be at least 1 (got {value})")]
    HealthFloor { field: &'static str, value: i32 },
    #[error("trap budget {budget} exceeds track length {len}")]
    TrapBudget { budget: u8, len: u8 },
}

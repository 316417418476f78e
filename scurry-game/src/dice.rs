//! Deterministic dice behind the engine's randomness seam.
//!
//! The engine never touches an ambient generator: every command draws from
//! an injected [`DieRoller`]. The production implementation keeps one
//! seeded stream per side so Mouse draws can never perturb Cat draws, and
//! a fixed user seed reproduces a full game transcript.

use hmac::{Hmac, Mac};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::collections::VecDeque;

use crate::constants::{DIE_MAX, DIE_MIN};
use crate::state::TurnOwner;

/// Randomness port: a bounded die roll for the acting side.
///
/// Implementations must return faces in `[DIE_MIN, DIE_MAX]` (1..=3).
pub trait DieRoller {
    fn roll(&mut self, side: TurnOwner) -> u8;
}

/// Production dice: per-side streams derived from one user-visible seed.
#[derive(Debug, Clone)]
pub struct SeededDice {
    mouse: DieStream,
    cat: DieStream,
}

impl SeededDice {
    /// Construct both streams from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            mouse: DieStream::new(stream_seed(seed, b"mouse")),
            cat: DieStream::new(stream_seed(seed, b"cat")),
        }
    }

    /// Number of draws performed for the given side.
    #[must_use]
    pub const fn draws(&self, side: TurnOwner) -> u64 {
        match side {
            TurnOwner::Mouse => self.mouse.draws,
            TurnOwner::Cat => self.cat.draws,
        }
    }
}

impl DieRoller for SeededDice {
    fn roll(&mut self, side: TurnOwner) -> u8 {
        match side {
            TurnOwner::Mouse => self.mouse.roll(),
            TurnOwner::Cat => self.cat.roll(),
        }
    }
}

/// Counting wrapper around a single seeded stream.
#[derive(Debug, Clone)]
struct DieStream {
    rng: ChaCha20Rng,
    draws: u64,
}

impl DieStream {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    fn roll(&mut self) -> u8 {
        self.draws = self.draws.saturating_add(1);
        self.rng.random_range(DIE_MIN..=DIE_MAX)
    }
}

/// Derive a per-side stream seed so the two sequences stay independent.
fn stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Predetermined dice for tests and replays.
///
/// Faces are consumed front to back regardless of side; out-of-range faces
/// are clamped into the die bounds, and an exhausted script keeps
/// returning the minimum face rather than panicking.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u8>,
}

impl ScriptedDice {
    #[must_use]
    pub fn from_rolls(rolls: impl IntoIterator<Item = u8>) -> Self {
        Self {
            faces: rolls.into_iter().collect(),
        }
    }

    /// Faces not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DieRoller for ScriptedDice {
    fn roll(&mut self, _side: TurnOwner) -> u8 {
        self.faces
            .pop_front()
            .map_or(DIE_MIN, |face| face.clamp(DIE_MIN, DIE_MAX))
    }
}

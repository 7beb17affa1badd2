//! Puzzle core for a prime-path grid game.
//!
//! A run starts in the top-left corner of a square grid of numbers and is won by reaching the
//! bottom-right corner stepping only on primes. Stepping on a composite resets the run. Rendering,
//! audio and input devices live outside this crate: they feed [`Direction`]s into a
//! [`RunController`] and render the [`RunEvent`]s it returns.

use core::time::Duration;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use controller::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use path::*;
pub use prime::*;
pub use storage::*;
pub use types::*;

mod cell;
mod controller;
mod error;
mod generator;
mod grid;
mod path;
mod prime;
mod storage;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord,
    /// Chance for a cell off the guaranteed path to hold a prime.
    pub bonus_prime_chance: f64,
    pub completion_bonus: Score,
    /// Window after a move during which new intents are dropped.
    pub move_cooldown: Duration,
}

impl GameConfig {
    pub const MIN_SIZE: Coord = 2;
    /// Largest board whose cells can all hold distinct values from `2..=100`.
    pub const MAX_SIZE: Coord = 9;
    pub const DEFAULT_SIZE: Coord = 8;
    pub const DEFAULT_BONUS_PRIME_CHANCE: f64 = 0.4;
    pub const DEFAULT_COMPLETION_BONUS: Score = 500;
    pub const DEFAULT_MOVE_COOLDOWN: Duration = Duration::from_millis(200);

    pub const fn new_unchecked(
        size: Coord,
        bonus_prime_chance: f64,
        completion_bonus: Score,
        move_cooldown: Duration,
    ) -> Self {
        Self {
            size,
            bonus_prime_chance,
            completion_bonus,
            move_cooldown,
        }
    }

    pub fn new(size: Coord) -> Self {
        let size = size.clamp(Self::MIN_SIZE, Self::MAX_SIZE);
        Self::new_unchecked(
            size,
            Self::DEFAULT_BONUS_PRIME_CHANCE,
            Self::DEFAULT_COMPLETION_BONUS,
            Self::DEFAULT_MOVE_COOLDOWN,
        )
    }

    pub fn with_bonus_prime_chance(self, chance: f64) -> Self {
        let bonus_prime_chance = if chance.is_nan() {
            Self::DEFAULT_BONUS_PRIME_CHANCE
        } else {
            chance.clamp(0.0, 1.0)
        };
        Self {
            bonus_prime_chance,
            ..self
        }
    }

    pub const fn with_completion_bonus(self, completion_bonus: Score) -> Self {
        Self {
            completion_bonus,
            ..self
        }
    }

    pub const fn with_move_cooldown(self, move_cooldown: Duration) -> Self {
        Self {
            move_cooldown,
            ..self
        }
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size, self.size)
    }

    pub const fn goal(&self) -> Coord2 {
        let last = self.size.saturating_sub(1);
        (last, last)
    }

    /// Number of cells on a right/down staircase from corner to corner.
    pub const fn guaranteed_path_len(&self) -> usize {
        (2 * self.size as usize).saturating_sub(1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

use serde::{Deserialize, Serialize};

use crate::is_prime;

/// A numbered board cell, primality is derived once from the value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    value: u8,
    is_prime: bool,
}

impl Cell {
    pub const fn new(value: u8) -> Self {
        Self {
            value,
            is_prime: is_prime(value as u32),
        }
    }

    pub const fn value(self) -> u8 {
        self.value
    }

    pub const fn is_prime(self) -> bool {
        self.is_prime
    }
}

impl From<u8> for Cell {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

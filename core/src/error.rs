use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Target is not one step away from the current position")]
    NotAdjacent,
    #[error("No run is accepting moves")]
    NoActiveRun,
    #[error("A run is already in progress")]
    RunInProgress,
    #[error("Previous move has not settled yet")]
    MoveInFlight,
    #[error("Grid rows do not form a square")]
    InvalidGridShape,
    #[error("Value {0} appears more than once")]
    DuplicateValue(u8),
    #[error("Value {0} is outside of 2..=100")]
    ValueOutOfRange(u8),
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failures reported by a [`crate::KeyValueStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed value {value:?} stored under {key:?}")]
    Malformed { key: String, value: String },
}

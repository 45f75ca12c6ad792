use thiserror::Error;

use crate::PoolKey;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Unsatisfiable level spec: {0}")]
    InvalidSpec(#[from] SpecViolation),
    #[error("No pool registered for {0:?}")]
    UnknownKey(PoolKey),
    #[error("Level catalogue is not valid JSON")]
    MalformedCatalogue,
    #[error("Level catalogue has no levels")]
    EmptyCatalogue,
    #[error("Level already ended, no new moves are accepted")]
    AlreadyEnded,
}

/// Reasons a level spec cannot produce a valid board.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpecViolation {
    #[error("Declared tile counts sum to {declared}, board needs {expected}")]
    TileCountMismatch {
        declared: u32,
        expected: u32,
    },
    #[error("Minimum diamonds ({min_sum}) exceed the level total ({total})")]
    TooManyRequiredDiamonds {
        min_sum: u32,
        total: u32,
    },
    #[error("Maximum diamonds ({max_sum}) cannot reach the level total ({total})")]
    NotEnoughDiamondCapacity {
        max_sum: u32,
        total: u32,
    },
    #[error("Diamond range {min}..={max} is not one a cell can hold")]
    InvalidDiamondRange {
        min: u8,
        max: u8,
    },
    #[error("Rank thresholds must satisfy gold >= silver >= bronze")]
    UnorderedThresholds,
}

pub type Result<T> = core::result::Result<T, GameError>;

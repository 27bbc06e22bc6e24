//! Error types
//!
//! Only construction can fail: arena generation preconditions and tuning
//! values. A running session never errors.

use thiserror::Error;

/// Rejected arena requests
#[derive(Error, Debug)]
pub enum ArenaError {
    /// Maze side length below the supported minimum
    #[error("maze size {size} is too small, minimum is {min}")]
    MazeTooSmall { size: usize, min: usize },

    /// Platform course with no regular platforms
    #[error("platform course needs at least one platform")]
    EmptyCourse,

    /// Session tuning failed validation
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

/// Failures loading or validating tuning data
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value outside its usable range
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

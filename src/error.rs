//! Error types shared by the scheduling engine and its storage layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LeitnerError>;

#[derive(Debug, Error)]
pub enum LeitnerError {
    /// Box number outside 1..=5 reached the interval table.
    #[error("Box number must be between 1-5, got {0}")]
    InvalidBox(i64),

    /// Scheduling would step past the calendar's representable range.
    #[error("review date out of range: {0} + {1} days")]
    DateOutOfRange(chrono::NaiveDate, i64),

    #[error("no review state for flashcard {0}")]
    NotFound(i64),

    #[error("no user with id {0}")]
    UnknownUser(i64),

    /// Rejected input, raised before anything is written.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A thread panicked while holding the shared connection.
    #[error("database unavailable")]
    Lock,
}

impl LeitnerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

//! Event types for profiling.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A profiling event with timestamp and optional duration.
#[derive(Serialize)]
pub struct ProfileEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    /// Duration in microseconds (for timed events)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_us: Option<u64>,
}

impl ProfileEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            duration_us: None,
        }
    }

    pub fn with_duration(event_type: EventType, duration: std::time::Duration) -> Self {
        Self {
            duration_us: Some(duration.as_micros() as u64),
            ..Self::new(event_type)
        }
    }
}

/// Types of events that can be logged.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventType {
    SessionStart {
        session_id: String,
    },
    SessionEnd {
        total_events: u64,
    },

    /// Database query issued
    DbQuery {
        /// select, insert, update, delete
        operation: String,
        table: String,
    },

    /// Review processed and the card moved between boxes
    ReviewTransition {
        flashcard_id: i64,
        old_box: u8,
        new_box: u8,
    },

    /// Due cards selected for a session
    DueSelection {
        order: String,
        topic_id: Option<i64>,
        user_id: Option<i64>,
        cards: usize,
    },

    /// Typed answer compared
    AnswerCheck {
        strictness: String,
        is_correct: bool,
    },

    TimedScope {
        name: String,
        duration_ms: u64,
    },
}

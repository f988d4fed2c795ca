use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::Strictness;

/// Leitner state of a single flashcard (one-to-one with the card)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
  pub flashcard_id: i64,
  /// Always within 1..=5
  pub box_number: u8,
  pub next_review_date: NaiveDate,
  pub last_reviewed: Option<DateTime<Utc>>,
  pub correct_count: i64,
  pub incorrect_count: i64,
}

impl ReviewState {
  pub fn total_reviews(&self) -> i64 {
    self.correct_count + self.incorrect_count
  }
}

/// Append-only record of one processed review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
  pub id: i64,
  pub flashcard_id: i64,
  pub user_id: i64,
  pub review_date: DateTime<Utc>,
  pub was_correct: bool,
  pub time_spent_seconds: Option<i64>,
}

/// Outcome of processing a review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
  pub old_box: u8,
  pub new_box: u8,
  pub next_review_date: NaiveDate,
  pub correct_count: i64,
  pub incorrect_count: i64,
  pub moved_up: bool,
  pub moved_down: bool,
}

/// Ordering of due cards in a review session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOrder {
  /// Fresh unseeded shuffle on every query
  #[default]
  Random,
  OldestFirst,
  NewestFirst,
}

impl ReviewOrder {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Random => "random",
      Self::OldestFirst => "oldest_first",
      Self::NewestFirst => "newest_first",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "random" => Some(Self::Random),
      "oldest_first" => Some(Self::OldestFirst),
      "newest_first" => Some(Self::NewestFirst),
      _ => None,
    }
  }
}

/// Per-user review settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPreferences {
  pub cards_per_session: i64,
  pub review_order: ReviewOrder,
  pub answer_mode: Strictness,
}

impl Default for ReviewPreferences {
  fn default() -> Self {
    Self {
      cards_per_session: crate::config::DEFAULT_CARDS_PER_SESSION,
      review_order: ReviewOrder::default(),
      answer_mode: Strictness::default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_review_order_from_str() {
    assert_eq!(ReviewOrder::from_str("random"), Some(ReviewOrder::Random));
    assert_eq!(ReviewOrder::from_str("oldest_first"), Some(ReviewOrder::OldestFirst));
    assert_eq!(ReviewOrder::from_str("newest_first"), Some(ReviewOrder::NewestFirst));
    assert_eq!(ReviewOrder::from_str("Random"), None);
    assert_eq!(ReviewOrder::from_str(""), None);
  }

  #[test]
  fn test_review_order_roundtrip() {
    for order in [ReviewOrder::Random, ReviewOrder::OldestFirst, ReviewOrder::NewestFirst] {
      assert_eq!(ReviewOrder::from_str(order.as_str()), Some(order));
    }
  }

  #[test]
  fn test_review_order_serde() {
    let order: ReviewOrder = serde_json::from_str("\"newest_first\"").unwrap();
    assert_eq!(order, ReviewOrder::NewestFirst);
    assert_eq!(serde_json::to_string(&ReviewOrder::OldestFirst).unwrap(), "\"oldest_first\"");
  }

  #[test]
  fn test_default_preferences() {
    let prefs = ReviewPreferences::default();
    assert_eq!(prefs.cards_per_session, 20);
    assert_eq!(prefs.review_order, ReviewOrder::Random);
    assert_eq!(prefs.answer_mode, Strictness::Normal);
  }

  #[test]
  fn test_total_reviews() {
    let state = ReviewState {
      flashcard_id: 1,
      box_number: 3,
      next_review_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
      last_reviewed: None,
      correct_count: 4,
      incorrect_count: 2,
    };
    assert_eq!(state.total_reviews(), 6);
  }
}

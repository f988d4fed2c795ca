use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub email: String,
  pub created_at: DateTime<Utc>,
}

/// Vocabulary topic; cards from several users can share one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
  pub id: i64,
  /// Question / word
  pub front: String,
  /// Answer / definition
  pub back: String,
  pub example: Option<String>,
  pub created_at: DateTime<Utc>,
  pub topic_id: i64,
  pub user_id: i64,
}

/// Input for creating a flashcard
#[derive(Debug, Clone, Deserialize)]
pub struct NewFlashcard {
  pub front: String,
  pub back: String,
  pub example: Option<String>,
  pub topic_id: i64,
  pub user_id: i64,
  #[serde(default = "Utc::now")]
  pub created_at: DateTime<Utc>,
}

impl NewFlashcard {
  pub fn new(front: String, back: String, topic_id: i64, user_id: i64) -> Self {
    Self {
      front,
      back,
      example: None,
      topic_id,
      user_id,
      created_at: Utc::now(),
    }
  }

  pub fn with_example(mut self, example: impl Into<String>) -> Self {
    self.example = Some(example.into());
    self
  }

  pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
    self.created_at = created_at;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_new_flashcard_defaults() {
    let card = NewFlashcard::new("perro".into(), "dog".into(), 3, 7);
    assert_eq!(card.front, "perro");
    assert_eq!(card.back, "dog");
    assert!(card.example.is_none());
    assert_eq!(card.topic_id, 3);
    assert_eq!(card.user_id, 7);
  }

  #[test]
  fn test_new_flashcard_builders() {
    let when = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let card = NewFlashcard::new("gato".into(), "cat".into(), 1, 1)
      .with_example("El gato duerme")
      .created_at(when);
    assert_eq!(card.example.as_deref(), Some("El gato duerme"));
    assert_eq!(card.created_at, when);
  }

  #[test]
  fn test_new_flashcard_deserialize_defaults_timestamp() {
    let card: NewFlashcard =
      serde_json::from_str(r#"{"front":"a","back":"b","example":null,"topic_id":1,"user_id":2}"#)
        .unwrap();
    assert_eq!(card.user_id, 2);
    assert!(card.created_at <= Utc::now());
  }
}

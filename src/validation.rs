//! Typed-answer checking for review sessions.
//!
//! Three strictness levels:
//! - `strict` - exact match, only surrounding whitespace ignored
//! - `normal` - case-insensitive
//! - `lenient` - case-insensitive, punctuation dropped, whitespace runs collapsed

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PUNCTUATION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"));
static WHITESPACE_RUN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// How forgiving the comparison between typed and expected answers is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
  Strict,
  #[default]
  Normal,
  Lenient,
}

impl Strictness {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Strict => "strict",
      Self::Normal => "normal",
      Self::Lenient => "lenient",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "strict" => Some(Self::Strict),
      "normal" => Some(Self::Normal),
      "lenient" => Some(Self::Lenient),
      _ => None,
    }
  }
}

/// Normalize text for comparison at the given strictness
pub fn normalize_text(text: &str, strictness: Strictness) -> String {
  if strictness == Strictness::Strict {
    return text.trim().to_string();
  }

  let lowered = text.trim().to_lowercase();
  if strictness == Strictness::Normal {
    return lowered;
  }

  let without_punct = PUNCTUATION.replace_all(&lowered, "");
  WHITESPACE_RUN
    .replace_all(&without_punct, " ")
    .trim()
    .to_string()
}

/// Check a typed answer against the expected one.
///
/// Blank answers on either side never match.
pub fn check_answer(user_answer: &str, correct_answer: &str, strictness: Strictness) -> bool {
  if user_answer.trim().is_empty() || correct_answer.trim().is_empty() {
    return false;
  }

  let matched = normalize_text(user_answer, strictness) == normalize_text(correct_answer, strictness);
  tracing::debug!(strictness = strictness.as_str(), matched, "answer checked");
  matched
}

/// Positional character similarity in `0.0..=1.0`, computed on lenient-normalized text
pub fn similarity(a: &str, b: &str) -> f64 {
  if a.is_empty() || b.is_empty() {
    return 0.0;
  }

  let a: Vec<char> = normalize_text(a, Strictness::Lenient).chars().collect();
  let b: Vec<char> = normalize_text(b, Strictness::Lenient).chars().collect();

  if a == b {
    return 1.0;
  }

  let max_len = a.len().max(b.len());
  if max_len == 0 {
    return 0.0;
  }

  let matches = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
  matches as f64 / max_len as f64
}

//! Leitner box scheduling.
//!
//! Cards live in one of five boxes. A correct answer moves a card up one box
//! (box 5 is terminal), a wrong answer sends it back to box 1. Each box has a
//! fixed review interval:
//!
//! | Box | Interval  |
//! |-----|-----------|
//! | 1   | 1 day     |
//! | 2   | 3 days    |
//! | 3   | 7 days    |
//! | 4   | 14 days   |
//! | 5   | 30 days   |

use chrono::{Days, NaiveDate, Utc};

use crate::error::{LeitnerError, Result};

pub const MIN_BOX: u8 = 1;
pub const MAX_BOX: u8 = 5;

/// Review interval in days, indexed by `box - 1`
pub const BOX_INTERVALS: [i64; 5] = [1, 3, 7, 14, 30];

/// Current calendar day (UTC). All "today" defaults go through here.
pub fn today() -> NaiveDate {
  Utc::now().date_naive()
}

pub fn interval_for(box_number: i64) -> Result<i64> {
  if !(MIN_BOX as i64..=MAX_BOX as i64).contains(&box_number) {
    return Err(LeitnerError::InvalidBox(box_number));
  }
  Ok(BOX_INTERVALS[(box_number - 1) as usize])
}

/// Date of the next review for a card sitting in `box_number`, counted from `from_date`.
pub fn next_review_date(box_number: i64, from_date: NaiveDate) -> Result<NaiveDate> {
  let days = interval_for(box_number)?;
  from_date
    .checked_add_days(Days::new(days as u64))
    .ok_or(LeitnerError::DateOutOfRange(from_date, days))
}

/// Same as [`next_review_date`], counted from today.
pub fn next_review_date_from_today(box_number: i64) -> Result<NaiveDate> {
  next_review_date(box_number, today())
}

/// Inclusive: a card scheduled for today is due, and overdue cards stay due.
pub fn is_due(next_review_date: NaiveDate, today: NaiveDate) -> bool {
  next_review_date <= today
}

/// Signed day count until the review (negative when overdue).
pub fn days_until_review(next_review_date: NaiveDate, today: NaiveDate) -> i64 {
  (next_review_date - today).num_days()
}

/// Box a card lands in after a review outcome.
pub fn next_box(current: u8, was_correct: bool) -> Result<u8> {
  if !(MIN_BOX..=MAX_BOX).contains(&current) {
    return Err(LeitnerError::InvalidBox(current as i64));
  }
  if was_correct {
    Ok((current + 1).min(MAX_BOX))
  } else {
    Ok(MIN_BOX)
  }
}

pub mod leitner;

pub use leitner::{
  days_until_review, interval_for, is_due, next_box, next_review_date, next_review_date_from_today,
  today, BOX_INTERVALS, MAX_BOX, MIN_BOX,
};

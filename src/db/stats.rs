//! Progress aggregation over review states and history.
//!
//! Dates in the history table are compared by their UTC calendar day
//! (`substr(review_date, 1, 10)`).

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, Duration, NaiveDate};
use rusqlite::{params, Connection, Result as SqlResult, ToSql};
use serde::Serialize;

use crate::config::MAX_HISTORY_DAYS;
use crate::error::{LeitnerError, Result};
#[cfg(feature = "profiling")]
use crate::profiling::EventType;
use crate::srs;

use super::{decode_date, encode_date, percentage};

/// Progress of one user's cards within a topic.
///
/// An empty topic carries only `total` and an empty `by_box`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicProgress {
    pub total: i64,
    pub by_box: BTreeMap<u8, i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_today: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastered: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastered_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOverview {
    pub total_cards: i64,
    pub total_reviews: i64,
    pub reviews_today: i64,
    pub cards_due: i64,
    pub box_distribution: BTreeMap<u8, i64>,
    pub overall_accuracy: f64,
    pub mastered_cards: i64,
}

/// Daily review counts, one entry per day of the window, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSeries {
    pub dates: Vec<String>,
    pub total: Vec<i64>,
    pub correct: Vec<i64>,
    pub incorrect: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicStatistics {
    pub topic_id: i64,
    pub topic_name: String,
    pub total_cards: i64,
    pub mastered: i64,
    pub mastered_percentage: f64,
    pub total_reviews: i64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LearningStreak {
    pub current_streak: i64,
    pub longest_streak: i64,
}

fn zero_filled_boxes() -> BTreeMap<u8, i64> {
    (srs::MIN_BOX..=srs::MAX_BOX).map(|b| (b, 0)).collect()
}

/// Cards per box, zero-filled for boxes 1..5.
///
/// `filter` is a WHERE clause over `f` (flashcards) bound to `args`.
fn box_counts(conn: &Connection, filter: &str, args: &[&dyn ToSql]) -> SqlResult<BTreeMap<u8, i64>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT rs.box_number, COUNT(*)
        FROM review_states rs
        JOIN flashcards f ON f.id = rs.flashcard_id
        WHERE {filter}
        GROUP BY rs.box_number
        "#
    ))?;
    let rows = stmt
        .query_map(args, |row| Ok((row.get::<_, u8>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<SqlResult<Vec<_>>>()?;

    let mut counts = zero_filled_boxes();
    counts.extend(rows);
    Ok(counts)
}

// ==================== Topic progress ====================

/// Box breakdown of `user_id`'s cards in `topic_id`
pub fn topic_progress(conn: &Connection, topic_id: i64, user_id: i64, today: NaiveDate) -> Result<TopicProgress> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DbQuery {
        operation: "topic_progress".into(),
        table: "review_states".into(),
    });

    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM flashcards WHERE topic_id = ?1 AND user_id = ?2",
        params![topic_id, user_id],
        |row| row.get(0),
    )?;

    if total == 0 {
        return Ok(TopicProgress {
            total: 0,
            by_box: BTreeMap::new(),
            due_today: None,
            mastered: None,
            mastered_percentage: None,
        });
    }

    let by_box = box_counts(conn, "f.topic_id = ?1 AND f.user_id = ?2", params![topic_id, user_id])?;

    let due_today: i64 = conn.query_row(
        r#"
        SELECT COUNT(*)
        FROM review_states rs
        JOIN flashcards f ON f.id = rs.flashcard_id
        WHERE f.topic_id = ?1 AND f.user_id = ?2 AND rs.next_review_date <= ?3
        "#,
        params![topic_id, user_id, encode_date(today)],
        |row| row.get(0),
    )?;

    let mastered = by_box.get(&srs::MAX_BOX).copied().unwrap_or(0);

    Ok(TopicProgress {
        total,
        by_box,
        due_today: Some(due_today),
        mastered: Some(mastered),
        mastered_percentage: Some(percentage(mastered, total)),
    })
}

pub fn topic_progress_today(conn: &Connection, topic_id: i64, user_id: i64) -> Result<TopicProgress> {
    topic_progress(conn, topic_id, user_id, srs::today())
}

// ==================== User overview ====================

pub fn user_overview(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<UserOverview> {
    let total_cards: i64 = conn.query_row(
        "SELECT COUNT(*) FROM flashcards WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;

    let today_str = encode_date(today);
    let (total_reviews, correct_reviews, reviews_today): (i64, i64, i64) = conn.query_row(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(was_correct), 0),
               COALESCE(SUM(CASE WHEN substr(review_date, 1, 10) = ?2 THEN 1 ELSE 0 END), 0)
        FROM review_history
        WHERE user_id = ?1
        "#,
        params![user_id, today_str],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    let cards_due: i64 = conn.query_row(
        r#"
        SELECT COUNT(*)
        FROM review_states rs
        JOIN flashcards f ON f.id = rs.flashcard_id
        WHERE f.user_id = ?1 AND rs.next_review_date <= ?2
        "#,
        params![user_id, today_str],
        |row| row.get(0),
    )?;

    let box_distribution = box_counts(conn, "f.user_id = ?1", params![user_id])?;
    let mastered_cards = box_distribution.get(&srs::MAX_BOX).copied().unwrap_or(0);

    Ok(UserOverview {
        total_cards,
        total_reviews,
        reviews_today,
        cards_due,
        box_distribution,
        overall_accuracy: percentage(correct_reviews, total_reviews),
        mastered_cards,
    })
}

pub fn user_overview_today(conn: &Connection, user_id: i64) -> Result<UserOverview> {
    user_overview(conn, user_id, srs::today())
}

// ==================== Review history ====================

/// Per-day review counts over the `days` days ending with `today`.
///
/// `days` must lie in `1..=MAX_HISTORY_DAYS`.
pub fn review_history_series(conn: &Connection, user_id: i64, days: i64, today: NaiveDate) -> Result<ReviewSeries> {
    if !(1..=MAX_HISTORY_DAYS).contains(&days) {
        return Err(LeitnerError::validation(format!(
            "days must be between 1 and {MAX_HISTORY_DAYS}, got {days}"
        )));
    }
    let start = today
        .checked_sub_days(Days::new(days as u64 - 1))
        .ok_or_else(|| LeitnerError::validation(format!("history window of {days} days starts before the calendar")))?;

    let mut stmt = conn.prepare(
        r#"
        SELECT substr(review_date, 1, 10),
               COUNT(*),
               COALESCE(SUM(was_correct), 0)
        FROM review_history
        WHERE user_id = ?1 AND substr(review_date, 1, 10) BETWEEN ?2 AND ?3
        GROUP BY substr(review_date, 1, 10)
        "#,
    )?;
    let counts: HashMap<String, (i64, i64)> = stmt
        .query_map(params![user_id, encode_date(start), encode_date(today)], |row| {
            Ok((row.get::<_, String>(0)?, (row.get(1)?, row.get(2)?)))
        })?
        .collect::<SqlResult<_>>()?;

    let len = days as usize;
    let mut series = ReviewSeries {
        dates: Vec::with_capacity(len),
        total: Vec::with_capacity(len),
        correct: Vec::with_capacity(len),
        incorrect: Vec::with_capacity(len),
    };
    for date in start.iter_days().take(len) {
        let key = encode_date(date);
        let (total, correct) = counts.get(&key).copied().unwrap_or((0, 0));
        series.dates.push(key);
        series.total.push(total);
        series.correct.push(correct);
        series.incorrect.push(total - correct);
    }
    Ok(series)
}

pub fn review_history_series_today(conn: &Connection, user_id: i64, days: i64) -> Result<ReviewSeries> {
    review_history_series(conn, user_id, days, srs::today())
}

// ==================== Topic statistics ====================

/// One entry per topic in which the user owns at least one card, by topic id.
///
/// Review counts cover the user's reviews of any card in the topic.
pub fn topic_statistics(conn: &Connection, user_id: i64) -> Result<Vec<TopicStatistics>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT f.topic_id, COUNT(*), COALESCE(SUM(rh.was_correct), 0)
        FROM review_history rh
        JOIN flashcards f ON f.id = rh.flashcard_id
        WHERE rh.user_id = ?1
        GROUP BY f.topic_id
        "#,
    )?;
    let reviews: HashMap<i64, (i64, i64)> = stmt
        .query_map(params![user_id], |row| Ok((row.get::<_, i64>(0)?, (row.get(1)?, row.get(2)?))))?
        .collect::<SqlResult<_>>()?;

    let mut stmt = conn.prepare(
        r#"
        SELECT t.id, t.name, COUNT(f.id),
               COALESCE(SUM(CASE WHEN rs.box_number = ?2 THEN 1 ELSE 0 END), 0)
        FROM topics t
        JOIN flashcards f ON f.topic_id = t.id AND f.user_id = ?1
        LEFT JOIN review_states rs ON rs.flashcard_id = f.id
        GROUP BY t.id, t.name
        ORDER BY t.id
        "#,
    )?;
    let stats = stmt
        .query_map(params![user_id, srs::MAX_BOX], |row| {
            let topic_id: i64 = row.get(0)?;
            let total_cards: i64 = row.get(2)?;
            let mastered: i64 = row.get(3)?;
            let (total_reviews, correct) = reviews.get(&topic_id).copied().unwrap_or((0, 0));
            Ok(TopicStatistics {
                topic_id,
                topic_name: row.get(1)?,
                total_cards,
                mastered,
                mastered_percentage: percentage(mastered, total_cards),
                total_reviews,
                accuracy: percentage(correct, total_reviews),
            })
        })?
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(stats)
}

// ==================== Streaks ====================

/// Current and longest runs of consecutive days with at least one review
pub fn learning_streak(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<LearningStreak> {
    let mut stmt = conn.prepare(
        r#"
        SELECT DISTINCT substr(review_date, 1, 10)
        FROM review_history
        WHERE user_id = ?1 AND substr(review_date, 1, 10) <= ?2
        ORDER BY 1 DESC
        "#,
    )?;
    let days = stmt
        .query_map(params![user_id, encode_date(today)], |row| {
            let raw: String = row.get(0)?;
            decode_date(0, &raw)
        })?
        .collect::<SqlResult<Vec<_>>>()?;

    Ok(streak_from_days(&days, today))
}

pub fn learning_streak_today(conn: &Connection, user_id: i64) -> Result<LearningStreak> {
    learning_streak(conn, user_id, srs::today())
}

/// `days` must be distinct and sorted newest first.
fn streak_from_days(days: &[NaiveDate], today: NaiveDate) -> LearningStreak {
    let Some(&latest) = days.first() else {
        return LearningStreak::default();
    };

    let consecutive = |pair: &[NaiveDate]| pair[0] - pair[1] == Duration::days(1);

    // counting starts only from today or yesterday
    let current_streak = if today - latest <= Duration::days(1) {
        1 + days.windows(2).take_while(|&pair| consecutive(pair)).count() as i64
    } else {
        0
    };

    let mut longest_streak = 1;
    let mut run = 1;
    for pair in days.windows(2) {
        if consecutive(pair) {
            run += 1;
            longest_streak = longest_streak.max(run);
        } else {
            run = 1;
        }
    }

    LearningStreak {
        current_streak,
        longest_streak,
    }
}

//! Review states: processing outcomes, resets and per-card statistics

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult, Row, Transaction, TransactionBehavior};
use serde::Serialize;

use crate::domain::{ReviewRecord, ReviewState, Transition};
use crate::error::{LeitnerError, Result};
#[cfg(feature = "profiling")]
use crate::profiling::EventType;
use crate::srs;

use super::{decode_date, decode_timestamp, encode_date, encode_timestamp, percentage, user_exists};

/// Snapshot of a single card's progress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardStatistics {
    pub box_number: u8,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub total_reviews: i64,
    pub accuracy: f64,
    pub next_review_date: NaiveDate,
    pub last_reviewed: Option<DateTime<Utc>>,
}

pub fn get_review_state(conn: &Connection, flashcard_id: i64) -> Result<Option<ReviewState>> {
    let state = conn
        .query_row(
            r#"
        SELECT flashcard_id, box_number, next_review_date, last_reviewed, correct_count, incorrect_count
        FROM review_states WHERE flashcard_id = ?1
        "#,
            params![flashcard_id],
            row_to_state,
        )
        .optional()?;
    Ok(state)
}

/// Apply one review outcome to a card.
///
/// The state read, the state update and the history insert share one
/// IMMEDIATE transaction, so concurrent reviews of a card serialize and the
/// counters always match the number of history rows.
pub fn process_review(
    conn: &Connection,
    flashcard_id: i64,
    user_id: i64,
    was_correct: bool,
    time_spent_seconds: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Transition> {
    if let Some(secs) = time_spent_seconds {
        if secs < 0 {
            return Err(LeitnerError::validation(format!(
                "time_spent_seconds must be non-negative, got {secs}"
            )));
        }
    }

    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DbQuery {
        operation: "process_review".into(),
        table: "review_states".into(),
    });

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let state = get_review_state(&tx, flashcard_id)?.ok_or(LeitnerError::NotFound(flashcard_id))?;
    if !user_exists(&tx, user_id)? {
        return Err(LeitnerError::UnknownUser(user_id));
    }

    let old_box = state.box_number;
    let new_box = srs::next_box(old_box, was_correct)?;
    let (correct_count, incorrect_count) = if was_correct {
        (state.correct_count + 1, state.incorrect_count)
    } else {
        (state.correct_count, state.incorrect_count + 1)
    };
    let next_review_date = srs::next_review_date(i64::from(new_box), now.date_naive())?;
    let reviewed_at = encode_timestamp(&now);

    tx.execute(
        r#"
        UPDATE review_states
        SET box_number = ?1, next_review_date = ?2, last_reviewed = ?3,
            correct_count = ?4, incorrect_count = ?5
        WHERE flashcard_id = ?6
        "#,
        params![
            new_box,
            encode_date(next_review_date),
            reviewed_at,
            correct_count,
            incorrect_count,
            flashcard_id,
        ],
    )?;

    tx.execute(
        r#"
        INSERT INTO review_history (flashcard_id, user_id, review_date, was_correct, time_spent_seconds)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![flashcard_id, user_id, reviewed_at, was_correct, time_spent_seconds],
    )?;

    tx.commit()?;

    tracing::info!(
        flashcard_id,
        user_id,
        was_correct,
        old_box,
        new_box,
        next_review = %next_review_date,
        "review processed"
    );

    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::ReviewTransition {
        flashcard_id,
        old_box,
        new_box,
    });

    Ok(Transition {
        old_box,
        new_box,
        next_review_date,
        correct_count,
        incorrect_count,
        moved_up: was_correct && old_box < srs::MAX_BOX,
        moved_down: !was_correct,
    })
}

/// [`process_review`] stamped with the current time
pub fn process_review_now(
    conn: &Connection,
    flashcard_id: i64,
    user_id: i64,
    was_correct: bool,
    time_spent_seconds: Option<i64>,
) -> Result<Transition> {
    process_review(conn, flashcard_id, user_id, was_correct, time_spent_seconds, Utc::now())
}

/// Send a card back to box 1, due `today`. Counters and history are kept.
///
/// Returns false when the card has no review state.
pub fn reset_card(conn: &Connection, flashcard_id: i64, today: NaiveDate) -> Result<bool> {
    let updated = conn.execute(
        r#"
        UPDATE review_states
        SET box_number = ?1, next_review_date = ?2, last_reviewed = NULL
        WHERE flashcard_id = ?3
        "#,
        params![srs::MIN_BOX, encode_date(today), flashcard_id],
    )?;
    if updated > 0 {
        tracing::info!(flashcard_id, "card reset to box 1");
    }
    Ok(updated > 0)
}

pub fn card_statistics(conn: &Connection, flashcard_id: i64) -> Result<Option<CardStatistics>> {
    Ok(get_review_state(conn, flashcard_id)?.map(|state| {
        let total_reviews = state.total_reviews();
        CardStatistics {
            box_number: state.box_number,
            correct_count: state.correct_count,
            incorrect_count: state.incorrect_count,
            total_reviews,
            accuracy: percentage(state.correct_count, total_reviews),
            next_review_date: state.next_review_date,
            last_reviewed: state.last_reviewed,
        }
    }))
}

/// History of a card, oldest first
pub fn review_history_for_card(conn: &Connection, flashcard_id: i64) -> Result<Vec<ReviewRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, flashcard_id, user_id, review_date, was_correct, time_spent_seconds
        FROM review_history
        WHERE flashcard_id = ?1
        ORDER BY review_date ASC, id ASC
        "#,
    )?;
    let records = stmt
        .query_map(params![flashcard_id], |row| {
            let review_date: String = row.get(3)?;
            Ok(ReviewRecord {
                id: row.get(0)?,
                flashcard_id: row.get(1)?,
                user_id: row.get(2)?,
                review_date: decode_timestamp(3, &review_date)?,
                was_correct: row.get(4)?,
                time_spent_seconds: row.get(5)?,
            })
        })?
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(records)
}

fn row_to_state(row: &Row) -> SqlResult<ReviewState> {
    let next_review_date: String = row.get(2)?;
    let last_reviewed: Option<String> = row.get(3)?;
    Ok(ReviewState {
        flashcard_id: row.get(0)?,
        box_number: row.get(1)?,
        next_review_date: decode_date(2, &next_review_date)?,
        last_reviewed: last_reviewed.map(|raw| decode_timestamp(3, &raw)).transpose()?,
        correct_count: row.get(4)?,
        incorrect_count: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, day, seed_card, seed_topic, seed_user, TestEnv};

    fn setup() -> (TestEnv, i64, i64) {
        let env = TestEnv::new().unwrap();
        let user = seed_user(&env.conn, "ana");
        let topic = seed_topic(&env.conn, "Animals");
        let card = seed_card(&env.conn, topic, user, at(2024, 1, 1, 8));
        (env, user, card)
    }

    #[test]
    fn test_correct_reviews_climb_to_box_five() {
        let (env, user, card) = setup();
        let mut boxes = Vec::new();
        for i in 0..5 {
            let t = process_review(&env.conn, card, user, true, None, at(2024, 1, 1 + i, 10)).unwrap();
            boxes.push(t.new_box);
        }
        assert_eq!(boxes, vec![2, 3, 4, 5, 5]);

        let state = get_review_state(&env.conn, card).unwrap().unwrap();
        assert_eq!(state.box_number, 5);
        assert_eq!(state.correct_count, 5);
        // last review on Jan 5, box 5 => 30 days
        assert_eq!(state.next_review_date, day(2024, 2, 4));
    }

    #[test]
    fn test_transition_flags() {
        let (env, user, card) = setup();
        let up = process_review(&env.conn, card, user, true, Some(12), at(2024, 1, 1, 10)).unwrap();
        assert_eq!(up.old_box, 1);
        assert_eq!(up.new_box, 2);
        assert!(up.moved_up);
        assert!(!up.moved_down);
        assert_eq!(up.next_review_date, day(2024, 1, 4));

        let down = process_review(&env.conn, card, user, false, None, at(2024, 1, 4, 10)).unwrap();
        assert_eq!(down.old_box, 2);
        assert_eq!(down.new_box, 1);
        assert!(!down.moved_up);
        assert!(down.moved_down);
        assert_eq!(down.next_review_date, day(2024, 1, 5));
        assert_eq!((down.correct_count, down.incorrect_count), (1, 1));
    }

    #[test]
    fn test_box_five_correct_is_not_moved_up() {
        let (env, user, card) = setup();
        env.conn
            .execute("UPDATE review_states SET box_number = 5 WHERE flashcard_id = ?1", params![card])
            .unwrap();
        let t = process_review(&env.conn, card, user, true, None, at(2024, 3, 1, 10)).unwrap();
        assert_eq!((t.old_box, t.new_box), (5, 5));
        assert!(!t.moved_up);
    }

    #[test]
    fn test_incorrect_resets_from_any_box() {
        let (env, user, card) = setup();
        for start in [3u8, 5u8] {
            env.conn
                .execute(
                    "UPDATE review_states SET box_number = ?1 WHERE flashcard_id = ?2",
                    params![start, card],
                )
                .unwrap();
            let t = process_review(&env.conn, card, user, false, None, at(2024, 2, 1, 10)).unwrap();
            assert_eq!(t.old_box, start);
            assert_eq!(t.new_box, 1);
            assert_eq!(t.next_review_date, day(2024, 2, 2));
        }
    }

    #[test]
    fn test_missing_card_is_not_found() {
        let (env, user, _) = setup();
        let result = process_review(&env.conn, 999, user, true, None, at(2024, 1, 1, 10));
        assert!(matches!(result, Err(LeitnerError::NotFound(999))));
        assert!(review_history_for_card(&env.conn, 999).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_user_rejected_without_writes() {
        let (env, _, card) = setup();
        let result = process_review(&env.conn, card, 999, true, None, at(2024, 1, 1, 10));
        assert!(matches!(result, Err(LeitnerError::UnknownUser(999))));

        let state = get_review_state(&env.conn, card).unwrap().unwrap();
        assert_eq!(state.box_number, 1);
        assert_eq!(state.correct_count, 0);
        assert!(review_history_for_card(&env.conn, card).unwrap().is_empty());
    }

    #[test]
    fn test_failed_history_insert_rolls_back_state_update() {
        let (env, user, card) = setup();
        env.conn
            .execute_batch(
                r#"
            CREATE TRIGGER reject_history BEFORE INSERT ON review_history
            BEGIN
                SELECT RAISE(ABORT, 'history unavailable');
            END;
            "#,
            )
            .unwrap();

        let result = process_review(&env.conn, card, user, true, Some(3), at(2024, 1, 1, 10));
        assert!(matches!(result, Err(LeitnerError::Database(_))));

        let state = get_review_state(&env.conn, card).unwrap().unwrap();
        assert_eq!(state.box_number, 1);
        assert_eq!(state.correct_count, 0);
        assert!(state.last_reviewed.is_none());
        assert_eq!(state.next_review_date, day(2024, 1, 1));
        assert!(review_history_for_card(&env.conn, card).unwrap().is_empty());
        assert!(env.conn.is_autocommit());

        // the connection is usable again once the history table accepts rows
        env.conn.execute_batch("DROP TRIGGER reject_history;").unwrap();
        let t = process_review(&env.conn, card, user, true, Some(3), at(2024, 1, 1, 11)).unwrap();
        assert_eq!((t.old_box, t.new_box, t.correct_count), (1, 2, 1));
        assert_eq!(review_history_for_card(&env.conn, card).unwrap().len(), 1);
    }

    #[test]
    fn test_negative_time_spent_rejected_without_writes() {
        let (env, user, card) = setup();
        let result = process_review(&env.conn, card, user, true, Some(-1), at(2024, 1, 1, 10));
        assert!(matches!(result, Err(LeitnerError::Validation(_))));

        let state = get_review_state(&env.conn, card).unwrap().unwrap();
        assert_eq!(state.box_number, 1);
        assert_eq!(state.total_reviews(), 0);
        assert!(review_history_for_card(&env.conn, card).unwrap().is_empty());
    }

    #[test]
    fn test_counters_match_history() {
        let (env, user, card) = setup();
        let outcomes = [true, true, false, true, false, true, true];
        for (i, correct) in outcomes.iter().enumerate() {
            process_review(&env.conn, card, user, *correct, Some(5), at(2024, 1, 1 + i as u32, 10)).unwrap();
        }

        let stats = card_statistics(&env.conn, card).unwrap().unwrap();
        assert_eq!(stats.correct_count, 5);
        assert_eq!(stats.incorrect_count, 2);
        assert_eq!(stats.total_reviews, 7);
        assert_eq!(stats.accuracy, 71.43);
        assert_eq!(stats.last_reviewed, Some(at(2024, 1, 7, 10)));

        let history = review_history_for_card(&env.conn, card).unwrap();
        assert_eq!(history.len(), 7);
        assert_eq!(history.iter().map(|r| r.was_correct).collect::<Vec<_>>(), outcomes);
        assert!(history.windows(2).all(|w| w[0].review_date <= w[1].review_date));
        assert!(history.iter().all(|r| r.time_spent_seconds == Some(5) && r.user_id == user));
    }

    #[test]
    fn test_card_statistics_missing_and_fresh() {
        let (env, _, card) = setup();
        assert!(card_statistics(&env.conn, 999).unwrap().is_none());

        let fresh = card_statistics(&env.conn, card).unwrap().unwrap();
        assert_eq!(fresh.total_reviews, 0);
        assert_eq!(fresh.accuracy, 0.0);
        assert!(fresh.last_reviewed.is_none());
    }

    #[test]
    fn test_reset_card_keeps_counters() {
        let (env, user, card) = setup();
        process_review(&env.conn, card, user, true, None, at(2024, 1, 1, 10)).unwrap();
        process_review(&env.conn, card, user, true, None, at(2024, 1, 4, 10)).unwrap();

        assert!(reset_card(&env.conn, card, day(2024, 1, 5)).unwrap());
        let state = get_review_state(&env.conn, card).unwrap().unwrap();
        assert_eq!(state.box_number, 1);
        assert_eq!(state.next_review_date, day(2024, 1, 5));
        assert!(state.last_reviewed.is_none());
        assert_eq!(state.correct_count, 2);
        assert_eq!(review_history_for_card(&env.conn, card).unwrap().len(), 2);

        assert!(!reset_card(&env.conn, 999, day(2024, 1, 5)).unwrap());
    }
}

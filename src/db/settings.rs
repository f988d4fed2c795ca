//! Per-user review preferences and the review sessions built from them

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{Flashcard, ReviewOrder, ReviewPreferences};
use crate::error::{LeitnerError, Result};
use crate::srs;
use crate::validation::Strictness;

use super::get_due_cards;

pub fn get_review_preferences(conn: &Connection, user_id: i64) -> Result<ReviewPreferences> {
    let row: Option<(i64, String, String)> = conn
        .query_row(
            "SELECT cards_per_session, review_order, answer_mode FROM users WHERE id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;
    let Some((cards_per_session, order, mode)) = row else {
        return Err(LeitnerError::UnknownUser(user_id));
    };

    let defaults = ReviewPreferences::default();
    Ok(ReviewPreferences {
        cards_per_session,
        review_order: ReviewOrder::from_str(&order).unwrap_or_else(|| {
            tracing::warn!("Unknown review order {:?} for user {}, using default", order, user_id);
            defaults.review_order
        }),
        answer_mode: Strictness::from_str(&mode).unwrap_or_else(|| {
            tracing::warn!("Unknown answer mode {:?} for user {}, using default", mode, user_id);
            defaults.answer_mode
        }),
    })
}

pub fn update_review_preferences(conn: &Connection, user_id: i64, prefs: &ReviewPreferences) -> Result<()> {
    if prefs.cards_per_session < 1 {
        return Err(LeitnerError::validation(format!(
            "cards_per_session must be at least 1, got {}",
            prefs.cards_per_session
        )));
    }
    let updated = conn.execute(
        "UPDATE users SET cards_per_session = ?1, review_order = ?2, answer_mode = ?3 WHERE id = ?4",
        params![
            prefs.cards_per_session,
            prefs.review_order.as_str(),
            prefs.answer_mode.as_str(),
            user_id
        ],
    )?;
    if updated == 0 {
        return Err(LeitnerError::UnknownUser(user_id));
    }
    Ok(())
}

/// Due cards in the user's preferred order, capped at their session size
pub fn build_review_session(
    conn: &Connection,
    user_id: i64,
    topic_id: Option<i64>,
    today: NaiveDate,
) -> Result<Vec<Flashcard>> {
    let prefs = get_review_preferences(conn, user_id)?;
    let mut cards = get_due_cards(conn, topic_id, Some(user_id), prefs.review_order, today)?;
    cards.truncate(usize::try_from(prefs.cards_per_session).unwrap_or(0));
    Ok(cards)
}

pub fn build_review_session_today(conn: &Connection, user_id: i64, topic_id: Option<i64>) -> Result<Vec<Flashcard>> {
    build_review_session(conn, user_id, topic_id, srs::today())
}

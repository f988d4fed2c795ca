//! Users, topics and flashcards, plus the due-card query

use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult, Row};

use crate::domain::{Flashcard, NewFlashcard, ReviewOrder, Topic, User};
use crate::error::{LeitnerError, Result};
#[cfg(feature = "profiling")]
use crate::profiling::EventType;
use crate::srs;

use super::{decode_timestamp, encode_date, encode_timestamp};

const FLASHCARD_COLUMNS: &str = "f.id, f.front, f.back, f.example, f.created_at, f.topic_id, f.user_id";

// ==================== Users ====================

pub fn create_user(conn: &Connection, username: &str, email: &str) -> Result<i64> {
    if username.trim().is_empty() || email.trim().is_empty() {
        return Err(LeitnerError::validation("username and email are required"));
    }
    conn.execute(
        "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
        params![username.trim(), email.trim(), encode_timestamp(&Utc::now())],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, username, email, created_at FROM users WHERE id = ?1",
            params![id],
            |row| {
                let created_at: String = row.get(3)?;
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    created_at: decode_timestamp(3, &created_at)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

pub fn user_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

// ==================== Topics ====================

pub fn create_topic(conn: &Connection, name: &str, description: Option<&str>) -> Result<i64> {
    if name.trim().is_empty() {
        return Err(LeitnerError::validation("topic name is required"));
    }
    conn.execute(
        "INSERT INTO topics (name, description, created_at) VALUES (?1, ?2, ?3)",
        params![name.trim(), description, encode_timestamp(&Utc::now())],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_topic(conn: &Connection, id: i64) -> Result<Option<Topic>> {
    let topic = conn
        .query_row(
            "SELECT id, name, description, created_at FROM topics WHERE id = ?1",
            params![id],
            row_to_topic,
        )
        .optional()?;
    Ok(topic)
}

pub fn list_topics(conn: &Connection) -> Result<Vec<Topic>> {
    let mut stmt = conn.prepare("SELECT id, name, description, created_at FROM topics ORDER BY id")?;
    let topics = stmt
        .query_map([], row_to_topic)?
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(topics)
}

// ==================== Flashcards ====================

/// Insert a flashcard together with its box-1 review state.
///
/// The card is due on the day it is created.
pub fn create_flashcard(conn: &Connection, card: &NewFlashcard) -> Result<i64> {
    if card.front.trim().is_empty() || card.back.trim().is_empty() {
        return Err(LeitnerError::validation("flashcard front and back are required"));
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        r#"
    INSERT INTO flashcards (front, back, example, created_at, topic_id, user_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
        params![
            card.front.trim(),
            card.back.trim(),
            card.example,
            encode_timestamp(&card.created_at),
            card.topic_id,
            card.user_id,
        ],
    )?;
    let id = tx.last_insert_rowid();

    tx.execute(
        r#"
    INSERT INTO review_states (flashcard_id, box_number, next_review_date, correct_count, incorrect_count)
    VALUES (?1, ?2, ?3, 0, 0)
    "#,
        params![id, srs::MIN_BOX, encode_date(card.created_at.date_naive())],
    )?;
    tx.commit()?;

    tracing::debug!(flashcard_id = id, topic_id = card.topic_id, "flashcard created");
    Ok(id)
}

pub fn get_flashcard(conn: &Connection, id: i64) -> Result<Option<Flashcard>> {
    let card = conn
        .query_row(
            &format!("SELECT {FLASHCARD_COLUMNS} FROM flashcards f WHERE f.id = ?1"),
            params![id],
            row_to_flashcard,
        )
        .optional()?;
    Ok(card)
}

/// Delete a flashcard; its review state and history go with it.
pub fn delete_flashcard(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM flashcards WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

/// Cards whose review date has arrived.
///
/// Scoping: with a `topic_id`, every card in the topic qualifies whoever owns
/// it (topic-wide review sessions) and `user_id` is ignored. Only without a
/// topic does `user_id` restrict the result to the user's own cards.
pub fn get_due_cards(
    conn: &Connection,
    topic_id: Option<i64>,
    user_id: Option<i64>,
    order: ReviewOrder,
    today: NaiveDate,
) -> Result<Vec<Flashcard>> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DbQuery {
        operation: "select_due".into(),
        table: "flashcards".into(),
    });

    let (scope, scope_id) = match (topic_id, user_id) {
        (Some(topic), _) => ("AND f.topic_id = ?2", Some(topic)),
        (None, Some(user)) => ("AND f.user_id = ?2", Some(user)),
        (None, None) => ("", None),
    };
    let order_by = match order {
        ReviewOrder::OldestFirst => "ORDER BY f.created_at ASC, f.id ASC",
        ReviewOrder::NewestFirst => "ORDER BY f.created_at DESC, f.id DESC",
        ReviewOrder::Random => "",
    };

    let query = format!(
        r#"
    SELECT {FLASHCARD_COLUMNS}
    FROM flashcards f
    JOIN review_states rs ON rs.flashcard_id = f.id
    WHERE rs.next_review_date <= ?1 {scope}
    {order_by}
    "#
    );
    let mut stmt = conn.prepare(&query)?;
    let today = encode_date(today);

    let mut cards = match scope_id {
        Some(id) => stmt
            .query_map(params![today, id], row_to_flashcard)?
            .collect::<SqlResult<Vec<_>>>()?,
        None => stmt
            .query_map(params![today], row_to_flashcard)?
            .collect::<SqlResult<Vec<_>>>()?,
    };

    if order == ReviewOrder::Random {
        cards.shuffle(&mut rand::rng());
    }

    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DueSelection {
        order: order.as_str().into(),
        topic_id,
        user_id,
        cards: cards.len(),
    });

    tracing::debug!(
        ?topic_id,
        ?user_id,
        order = order.as_str(),
        count = cards.len(),
        "due cards selected"
    );
    Ok(cards)
}

/// [`get_due_cards`] as of today
pub fn get_due_cards_today(
    conn: &Connection,
    topic_id: Option<i64>,
    user_id: Option<i64>,
    order: ReviewOrder,
) -> Result<Vec<Flashcard>> {
    get_due_cards(conn, topic_id, user_id, order, srs::today())
}

fn row_to_topic(row: &Row) -> SqlResult<Topic> {
    let created_at: String = row.get(3)?;
    Ok(Topic {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: decode_timestamp(3, &created_at)?,
    })
}

fn row_to_flashcard(row: &Row) -> SqlResult<Flashcard> {
    let created_at: String = row.get(4)?;
    Ok(Flashcard {
        id: row.get(0)?,
        front: row.get(1)?,
        back: row.get(2)?,
        example: row.get(3)?,
        created_at: decode_timestamp(4, &created_at)?,
        topic_id: row.get(5)?,
        user_id: row.get(6)?,
    })
}

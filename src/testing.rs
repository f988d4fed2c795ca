//! Test utilities for database setup.
//!
//! Builds databases through the real migrations so tests never carry a
//! second copy of the schema.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::db::{self, DbPool};
use crate::domain::NewFlashcard;

/// Migrated database in a temporary directory, removed on drop.
pub struct TestEnv {
    /// Kept alive so the database file outlives the connection
    pub temp: TempDir,
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = db::open_connection(&temp.path().join("leitner.db"))?;
        db::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Hand the connection to a shared pool (for router tests).
    ///
    /// The directory is returned alongside so the caller keeps it alive.
    pub fn into_pool(self) -> (TempDir, DbPool) {
        (self.temp, Arc::new(Mutex::new(self.conn)))
    }
}

/// UTC timestamp on the hour
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn seed_user(conn: &Connection, username: &str) -> i64 {
    db::create_user(conn, username, &format!("{username}@example.com")).unwrap()
}

pub fn seed_topic(conn: &Connection, name: &str) -> i64 {
    db::create_topic(conn, name, None).unwrap()
}

/// Card in box 1, due on the day it was created
pub fn seed_card(conn: &Connection, topic_id: i64, user_id: i64, created_at: DateTime<Utc>) -> i64 {
    let card = NewFlashcard::new("front".into(), "back".into(), topic_id, user_id).created_at(created_at);
    db::create_flashcard(conn, &card).unwrap()
}

pub fn set_next_review(conn: &Connection, flashcard_id: i64, date: NaiveDate) {
    conn.execute(
        "UPDATE review_states SET next_review_date = ?1 WHERE flashcard_id = ?2",
        params![date.format("%Y-%m-%d").to_string(), flashcard_id],
    )
    .unwrap();
}

pub fn set_box(conn: &Connection, flashcard_id: i64, box_number: u8) {
    conn.execute(
        "UPDATE review_states SET box_number = ?1 WHERE flashcard_id = ?2",
        params![box_number, flashcard_id],
    )
    .unwrap();
}

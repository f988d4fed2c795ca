//! Schema creation and version-gated migrations.
//!
//! Each migration checks the recorded schema version, runs inside a
//! transaction and records its own version, so running twice is a no-op.

use chrono::Utc;
use rusqlite::{params, Connection, Result};

/// Current schema version. Increment when adding a migration.
pub const DB_VERSION: i32 = 2;

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS db_version (
      version INTEGER PRIMARY KEY,
      applied_at TEXT NOT NULL,
      description TEXT
    );
    "#,
  )?;

  let current_version = get_schema_version(conn)?;
  tracing::debug!("schema version: {}", current_version);

  if current_version < 1 {
    migrate_v0_to_v1(conn)?;
  }
  if current_version < 2 {
    migrate_v1_to_v2(conn)?;
  }

  Ok(())
}

/// v0→v1: users, topics, flashcards, review states and history
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
  tracing::info!("Running migration v0→v1: Create base tables");

  let tx = conn.unchecked_transaction()?;
  tx.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS users (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      username TEXT NOT NULL UNIQUE,
      email TEXT NOT NULL UNIQUE,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS topics (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      name TEXT NOT NULL UNIQUE,
      description TEXT,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS flashcards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      front TEXT NOT NULL,
      back TEXT NOT NULL,
      example TEXT,
      created_at TEXT NOT NULL,
      topic_id INTEGER NOT NULL,
      user_id INTEGER NOT NULL,
      FOREIGN KEY (topic_id) REFERENCES topics(id) ON DELETE CASCADE,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS review_states (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      flashcard_id INTEGER NOT NULL UNIQUE,
      box_number INTEGER NOT NULL DEFAULT 1 CHECK (box_number BETWEEN 1 AND 5),
      next_review_date TEXT NOT NULL,
      last_reviewed TEXT,
      correct_count INTEGER NOT NULL DEFAULT 0 CHECK (correct_count >= 0),
      incorrect_count INTEGER NOT NULL DEFAULT 0 CHECK (incorrect_count >= 0),
      FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS review_history (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      flashcard_id INTEGER NOT NULL,
      user_id INTEGER NOT NULL,
      review_date TEXT NOT NULL,
      was_correct INTEGER NOT NULL,
      time_spent_seconds INTEGER CHECK (time_spent_seconds IS NULL OR time_spent_seconds >= 0),
      FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_flashcards_topic_id ON flashcards(topic_id);
    CREATE INDEX IF NOT EXISTS idx_flashcards_user_id ON flashcards(user_id);
    CREATE INDEX IF NOT EXISTS idx_review_states_next_review ON review_states(next_review_date);
    CREATE INDEX IF NOT EXISTS idx_review_history_user_id ON review_history(user_id);
    CREATE INDEX IF NOT EXISTS idx_review_history_flashcard_id ON review_history(flashcard_id);
    CREATE INDEX IF NOT EXISTS idx_review_history_review_date ON review_history(review_date);
    "#,
  )?;
  record_version(&tx, 1, "Create base tables")?;
  tx.commit()
}

/// v1→v2: per-user review preferences
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
  tracing::info!("Running migration v1→v2: Add review preferences");

  let tx = conn.unchecked_transaction()?;
  add_column_if_missing(&tx, "users", "cards_per_session", "INTEGER NOT NULL DEFAULT 20")?;
  add_column_if_missing(&tx, "users", "review_order", "TEXT NOT NULL DEFAULT 'random'")?;
  add_column_if_missing(&tx, "users", "answer_mode", "TEXT NOT NULL DEFAULT 'normal'")?;
  record_version(&tx, 2, "Add review preferences to users")?;
  tx.commit()
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<()> {
  conn.execute(
    "INSERT OR REPLACE INTO db_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
    params![version, Utc::now().to_rfc3339(), description],
  )?;
  Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<i32> {
  conn.query_row("SELECT COALESCE(MAX(version), 0) FROM db_version", [], |row| row.get(0))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}

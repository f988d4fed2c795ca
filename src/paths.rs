//! Project path functions - single source of truth for file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! Useful for running isolated instances side by side:
//! ```bash
//! DATA_DIR=data/demo PORT=3001 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database path
pub fn db_path() -> String {
    format!("{}/leitner.db", data_dir())
}

/// Profiling output file for a session id
pub fn profile_log_path(session_id: &str) -> String {
    format!("{}/profile_{session_id}.jsonl", data_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    // OnceLock means env overrides can't be exercised here; check formats only.

    #[test]
    fn test_data_dir_default() {
        assert!(!data_dir().is_empty());
    }

    #[test]
    fn test_db_path_format() {
        assert!(db_path().ends_with("/leitner.db"));
    }

    #[test]
    fn test_profile_log_path() {
        let path = profile_log_path("20240101_120000");
        assert!(path.ends_with("/profile_20240101_120000.jsonl"));
    }
}

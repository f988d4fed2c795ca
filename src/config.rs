//! Application configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env) > default.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths;

// ==================== File Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
  database: Option<DatabaseConfig>,
  server: Option<ServerConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
  path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
  port: Option<u16>,
}

fn read_config_file(path: &Path) -> AppConfig {
  let Ok(contents) = std::fs::read_to_string(path) else {
    return AppConfig::default();
  };
  match toml::from_str::<AppConfig>(&contents) {
    Ok(config) => config,
    Err(e) => {
      tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
      AppConfig::default()
    }
  }
}

// ==================== Database Configuration ====================

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
  let _ = dotenvy::dotenv();
  database_path_from(Path::new("config.toml"), std::env::var("DATABASE_PATH").ok())
}

fn database_path_from(config_file: &Path, env_value: Option<String>) -> PathBuf {
  if let Some(path) = read_config_file(config_file).database.and_then(|db| db.path) {
    tracing::info!("Using database from config.toml: {}", path);
    return PathBuf::from(path);
  }

  if let Some(path) = env_value {
    tracing::info!("Using database from DATABASE_PATH env: {}", path);
    return PathBuf::from(path);
  }

  let default = PathBuf::from(paths::db_path());
  tracing::info!("Using default database path: {}", default.display());
  default
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 3000;

/// Port with priority: config.toml > PORT env > default
pub fn server_port() -> u16 {
  let _ = dotenvy::dotenv();
  server_port_from(Path::new("config.toml"), std::env::var("PORT").ok())
}

fn server_port_from(config_file: &Path, env_value: Option<String>) -> u16 {
  if let Some(port) = read_config_file(config_file).server.and_then(|s| s.port) {
    return port;
  }
  env_value
    .and_then(|p| p.parse().ok())
    .unwrap_or(SERVER_PORT)
}

/// Get the full server bind address
pub fn server_bind_addr() -> String {
  format!("{}:{}", SERVER_ADDR, server_port())
}

// ==================== Review Defaults ====================

/// Cards shown per review session unless the user picks otherwise
pub const DEFAULT_CARDS_PER_SESSION: i64 = 20;

/// Trailing window (days) for the review history chart
pub const DEFAULT_HISTORY_DAYS: i64 = 7;

/// Longest review history window a caller may request (about ten years)
pub const MAX_HISTORY_DAYS: i64 = 3650;

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_database_path_prefers_config_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("config.toml");
    std::fs::write(&file, "[database]\npath = \"from/config.db\"\n").unwrap();

    let path = database_path_from(&file, Some("from/env.db".into()));
    assert_eq!(path, PathBuf::from("from/config.db"));
  }

  #[test]
  fn test_database_path_falls_back_to_env() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("config.toml");

    let path = database_path_from(&missing, Some("from/env.db".into()));
    assert_eq!(path, PathBuf::from("from/env.db"));
  }

  #[test]
  fn test_database_path_default() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("config.toml");
    std::fs::write(&file, "[server]\nport = 8080\n").unwrap();

    let path = database_path_from(&file, None);
    assert!(path.to_string_lossy().ends_with("/leitner.db"));
  }

  #[test]
  fn test_malformed_config_is_ignored() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("config.toml");
    std::fs::write(&file, "this is = = not toml").unwrap();

    assert_eq!(server_port_from(&file, None), SERVER_PORT);
  }

  #[test]
  fn test_server_port_priority() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("config.toml");
    assert_eq!(server_port_from(&file, Some("4000".into())), 4000);
    assert_eq!(server_port_from(&file, Some("not-a-port".into())), SERVER_PORT);

    std::fs::write(&file, "[server]\nport = 8080\n").unwrap();
    assert_eq!(server_port_from(&file, Some("4000".into())), 8080);
  }
}

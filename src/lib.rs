pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod paths;
pub mod profiling;
pub mod srs;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{LeitnerError, Result};

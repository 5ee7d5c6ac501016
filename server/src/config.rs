//! Runtime configuration for the geoguess server.
//!
//! Every value has a compile-time default and can be overridden through an
//! environment variable. Command-line flags take precedence over both.

use std::path::PathBuf;

use crate::content::SelectionPolicy;
use crate::service::DEFAULT_ROUND_COUNT;

/// Get the location catalog directory.
///
/// Priority:
/// 1. `GEOGUESS_DATA_DIR` env variable if set
/// 2. `None`, meaning the built-in sample pool is used
pub fn get_data_dir() -> Option<PathBuf> {
    std::env::var("GEOGUESS_DATA_DIR").ok().map(PathBuf::from)
}

/// Get the number of rounds per game.
///
/// Priority:
/// 1. `GEOGUESS_ROUND_COUNT` env variable if set (falls back to the default
///    if the value cannot be parsed as a `usize`)
/// 2. `5` as fallback
pub fn get_round_count() -> usize {
    if let Ok(count) = std::env::var("GEOGUESS_ROUND_COUNT") {
        return count.parse().unwrap_or(DEFAULT_ROUND_COUNT);
    }

    DEFAULT_ROUND_COUNT
}

/// Get the round selection policy.
///
/// Priority:
/// 1. `GEOGUESS_SELECTION` env variable if set (`random` or `sequential`;
///    anything else falls back to the default)
/// 2. `random` as fallback
pub fn get_selection_policy() -> SelectionPolicy {
    std::env::var("GEOGUESS_SELECTION")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

/// Get the directory for rolling log files.
///
/// Priority:
/// 1. `GEOGUESS_LOG_DIR` env variable if set
/// 2. `None`, meaning logs go to stderr
pub fn get_log_dir() -> Option<PathBuf> {
    std::env::var("GEOGUESS_LOG_DIR").ok().map(PathBuf::from)
}

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ChessResult;

/// Deepest iterative-deepening pass the search will attempt.
pub const MAX_SEARCH_DEPTH: u32 = 100;

/// Controls how long and how deep the engine searches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock budget per move. `None` disables the timer and searches
    /// every depth up to `max_depth`, which makes the result deterministic.
    pub time_limit_ms: Option<u64>,
    pub max_depth: u32,
    /// How often the caller wakes up to check the clock.
    pub poll_interval_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            time_limit_ms: Some(3000),
            max_depth: MAX_SEARCH_DEPTH,
            poll_interval_ms: 5,
        }
    }
}

impl SearchConfig {
    /// Fixed-depth search with the timer disabled.
    pub fn fixed_depth(depth: u32) -> Self {
        SearchConfig {
            time_limit_ms: None,
            max_depth: depth,
            ..Self::default()
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn from_json(json: &str) -> ChessResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ChessResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

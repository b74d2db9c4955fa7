//! # Bot State
//!
//! Persistent state of the bot: the last episode title seen per feed, so a
//! restart does not announce the same episode again.
//! Serialized to `{data_dir}/state.json`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// State for a single feed.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedState {
    #[serde(default)]
    pub last_checked_title: Option<String>,
    /// Unix timestamp of the last announcement
    #[serde(default)]
    pub last_announced_at: Option<i64>,
}

/// Maps feed URLs to their state.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BotState {
    #[serde(default)]
    pub feeds: HashMap<String, FeedState>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl BotState {
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join("state.json")
    }

    /// Loads the state from `path` or returns an empty state bound to it.
    pub fn load(path: &Path) -> Self {
        let mut state = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<Self>(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable state {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        state.path = Some(path.to_path_buf());
        state
    }

    /// Gets or creates the state for a specific feed.
    pub fn get_feed_state(&mut self, url: &str) -> &mut FeedState {
        self.feeds.entry(url.to_string()).or_default()
    }

    pub fn last_checked_title(&self, url: &str) -> Option<String> {
        self.feeds.get(url).and_then(|f| f.last_checked_title.clone())
    }

    /// Persists the state to the file it was loaded from.
    pub fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    tracing::warn!("Failed to save state to {}: {}", path.display(), e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize state: {}", e),
        }
    }
}

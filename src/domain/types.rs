//! # Domain Types
//!
//! Parsed feed data shared by the feed cache, the commands, and the snapshot dumps.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single feed item (podcast episode or video).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub title: String,
    /// Web page of the episode
    #[serde(default)]
    pub link: String,
    /// `pubDate` / `published` exactly as found in the feed
    #[serde(default)]
    pub published_raw: String,
    #[serde(default)]
    pub published: Option<DateTime<FixedOffset>>,
    /// Media file download URL
    #[serde(default)]
    pub enclosure: Option<String>,
    /// HTML show notes
    #[serde(default)]
    pub content: String,
}

/// Parsed state of a feed at download time. Episodes are newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedSnapshot {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    pub episodes: Vec<Episode>,
    #[serde(default)]
    pub fetched_at: i64,
}

impl FeedSnapshot {
    pub fn latest(&self) -> Option<&Episode> {
        self.episodes.first()
    }
}

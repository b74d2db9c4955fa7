//! Test doubles shared by the unit tests.

use crate::domain::markup::Markup;
use crate::domain::traits::{ChatProvider, FeedSource};
use crate::domain::types::{Episode, FeedSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Chat that records everything sent to it.
pub struct RecordingChat {
    pub id: String,
    pub markup: Markup,
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingChat {
    pub fn new(markup: Markup) -> Self {
        Self {
            id: "chat-1".to_string(),
            markup,
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Markup::TelegramV2)
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn send_message(&self, content: &str) -> Result<String, String> {
        if self.fail {
            return Err("send failed".to_string());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(content.to_string());
        Ok(sent.len().to_string())
    }

    async fn send_plain(&self, content: &str) -> Result<(), String> {
        self.send_message(content).await.map(|_| ())
    }

    fn room_id(&self) -> String {
        self.id.clone()
    }

    fn markup(&self) -> Markup {
        self.markup
    }
}

/// In-memory feed source; `set` replaces what the next fetch returns.
#[derive(Default)]
pub struct StaticFeedSource {
    feeds: Mutex<HashMap<String, FeedSnapshot>>,
    pub fetches: AtomicUsize,
}

impl StaticFeedSource {
    pub fn with(url: &str, snapshot: FeedSnapshot) -> Self {
        let source = Self::default();
        source.set(url, snapshot);
        source
    }

    pub fn set(&self, url: &str, snapshot: FeedSnapshot) {
        self.feeds.lock().unwrap().insert(url.to_string(), snapshot);
    }

    pub fn remove(&self, url: &str) {
        self.feeds.lock().unwrap().remove(url);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch(&self, url: &str) -> anyhow::Result<FeedSnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.feeds
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unreachable feed {url}"))
    }
}

pub fn episode(title: &str, published: &str) -> Episode {
    Episode {
        title: title.to_string(),
        link: format!("https://example.org/{}", title.replace(' ', "-")),
        published_raw: published.to_string(),
        published: crate::infrastructure::feed_parser::parse_date(published),
        enclosure: None,
        content: String::new(),
    }
}

pub fn snapshot(title: &str, episodes: Vec<Episode>) -> FeedSnapshot {
    FeedSnapshot {
        title: Some(title.to_string()),
        link: Some("https://example.org".to_string()),
        episodes,
        fetched_at: 0,
    }
}

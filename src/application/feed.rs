//! # Podcast Feed
//!
//! Cached view of one podcast (or YouTube) feed. Downloads are cached for
//! `max_age` seconds and optionally dumped to disk so restarts can skip the
//! download. Also decides whether the latest episode is new and renders the
//! announcement messages.

use crate::domain::markup::{self, Markup};
use crate::domain::traits::FeedSource;
use crate::domain::types::{Episode, FeedSnapshot};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

const YOUTUBE_FEED_MARKER: &str = "www.youtube.com/feeds/videos.xml";

/// On-disk dump: the snapshot together with its download time.
#[derive(Debug, Serialize, Deserialize)]
struct FeedDump {
    last_updated: i64,
    snapshot: FeedSnapshot,
}

pub struct PodcastFeed {
    url: String,
    max_age: i64,
    dump: Option<PathBuf>,
    snapshot: FeedSnapshot,
    last_updated: i64,
    last_checked_title: Option<String>,
    source: Arc<dyn FeedSource>,
}

impl PodcastFeed {
    /// Loads the feed from its dump if one exists, otherwise downloads it.
    pub async fn load(
        url: impl Into<String>,
        max_age_secs: u64,
        dump: Option<PathBuf>,
        source: Arc<dyn FeedSource>,
    ) -> Result<Self> {
        let mut feed = Self {
            url: url.into(),
            max_age: max_age_secs as i64,
            dump,
            snapshot: FeedSnapshot::default(),
            last_updated: 0,
            last_checked_title: None,
            source,
        };

        match feed.read_dump().await {
            Ok(Some(dump)) => {
                tracing::info!("Reloaded dumped feed for {}", feed.url);
                feed.snapshot = dump.snapshot;
                feed.last_updated = dump.last_updated;
            }
            Ok(None) => {
                tracing::info!("Loading feed {}", feed.url);
                feed.download().await?;
            }
            Err(e) => {
                tracing::info!("{:#}", e);
                tracing::info!("Failed loading dumped feed. Falling back to download.");
                feed.download().await?;
            }
        }
        Ok(feed)
    }

    async fn read_dump(&self) -> Result<Option<FeedDump>> {
        let Some(path) = self.dump.as_ref().filter(|p| p.is_file()) else {
            return Ok(None);
        };
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read dump {}", path.display()))?;
        let dump = serde_json::from_str(&content)
            .with_context(|| format!("Failed to decode dump {}", path.display()))?;
        Ok(Some(dump))
    }

    async fn download(&mut self) -> Result<()> {
        self.snapshot = self.source.fetch(&self.url).await?;
        self.last_updated = Utc::now().timestamp();

        if let Some(path) = &self.dump {
            let dump = FeedDump {
                last_updated: self.last_updated,
                snapshot: self.snapshot.clone(),
            };
            let content = serde_json::to_string(&dump)?;
            tokio::fs::write(path, content)
                .await
                .with_context(|| format!("Failed to write dump {}", path.display()))?;
        }
        Ok(())
    }

    /// Downloads again when forced or when the cached copy is older than `max_age`.
    pub async fn refresh(&mut self, force: bool) -> Result<()> {
        if force || self.last_updated + self.max_age < Utc::now().timestamp() {
            tracing::debug!("Refreshing feed {}", self.url);
            self.download().await?;
        }
        Ok(())
    }

    /// Unforced refresh that keeps serving the cached copy on failure.
    pub async fn refresh_or_cached(&mut self) {
        if let Err(e) = self.refresh(false).await {
            tracing::warn!("Refresh of {} failed, using cached copy: {:#}", self.url, e);
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        self.snapshot.title.as_deref().unwrap_or(&self.url)
    }

    /// Web site of the feed; the feed URL when the feed names none.
    pub fn site_link(&self) -> &str {
        self.snapshot.link.as_deref().unwrap_or(&self.url)
    }

    pub fn snapshot(&self) -> &FeedSnapshot {
        &self.snapshot
    }

    pub fn latest_episode(&self) -> Option<&Episode> {
        self.snapshot.latest()
    }

    pub async fn episode_titles(&mut self) -> Vec<String> {
        self.refresh_or_cached().await;
        self.snapshot.episodes.iter().map(|e| e.title.clone()).collect()
    }

    pub fn is_youtube(&self) -> bool {
        self.url.contains(YOUTUBE_FEED_MARKER)
    }

    /// Media file of the requested episode.
    pub fn download_link(&self, episode_index: usize) -> Option<&str> {
        self.snapshot
            .episodes
            .get(episode_index)
            .and_then(|e| e.enclosure.as_deref())
    }

    pub fn last_checked_title(&self) -> Option<&str> {
        self.last_checked_title.as_deref()
    }

    pub fn set_last_checked_title(&mut self, title: Option<String>) {
        self.last_checked_title = title;
    }

    /// Message informing about the episode at `episode_index`.
    ///
    /// With `new` it announces a fresh release, otherwise it names the latest
    /// episode and its release date. `None` when the index is out of range.
    pub fn build_message(&self, episode_index: usize, new: bool, markup: Markup) -> Option<String> {
        let episode = self.snapshot.episodes.get(episode_index)?;
        let feed_title = markup::escape(markup, self.title());
        let episode_title = markup::escape(markup, &episode.title);
        let web_link = if episode.link.is_empty() {
            self.site_link()
        } else {
            &episode.link
        };
        let verb = if self.is_youtube() { "ansehen" } else { "anhören" };

        let mut message = if new {
            format!(
                "{}\nEine neue Folge von \"{}\" ist erschienen\\!\n",
                markup::bold(markup, &episode_title),
                feed_title
            )
        } else {
            let date = match episode.published {
                Some(published) => published.format("%d.%m.%Y").to_string(),
                None => episode.published_raw.clone(),
            };
            format!(
                "{}\nDie letzte Episode ist {} vom {}\\.\n",
                markup::bold(markup, &feed_title),
                markup::bold(markup, &episode_title),
                markup::escape(markup, &date)
            )
        };

        match self.download_link(episode_index) {
            Some(dl_link) => message.push_str(&format!(
                "Jetzt {}: {} {}",
                verb,
                markup::link(markup, "Webseite", web_link),
                markup::link(markup, "Download", dl_link)
            )),
            None => message.push_str(&markup::link(markup, &format!("Jetzt {verb}"), web_link)),
        }
        Some(message)
    }

    /// Whether an episode was published since the last check.
    ///
    /// The first check accepts episodes younger than `initial_check_age`;
    /// later checks compare the latest title with the previously seen one.
    /// `max_age` forces a (re)announcement of episodes younger than it.
    pub async fn check_new_episode(
        &mut self,
        initial_check_age: i64,
        max_age: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.refresh(true).await?;
        let (latest_title, published) = {
            let latest = self
                .latest_episode()
                .with_context(|| format!("Feed {} has no episodes", self.url))?;
            (latest.title.clone(), latest.published.map(|p| p.with_timezone(&Utc)))
        };
        let younger_than = |secs: i64| published.is_some_and(|p| p > now - Duration::seconds(secs));

        let mut found_new_episode = match &self.last_checked_title {
            None => younger_than(initial_check_age),
            Some(title) => *title != latest_title,
        };
        if let Some(max_age) = max_age {
            found_new_episode |= younger_than(max_age);
        }

        self.last_checked_title = Some(latest_title);
        Ok(found_new_episode)
    }
}

//! # Feed Checker
//!
//! Periodic new-episode detection. Every feed is checked once per interval;
//! new episodes are broadcast and the last seen titles persisted.

use crate::application::broadcast::Broadcaster;
use crate::application::feed::PodcastFeed;
use crate::application::state::BotState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub type SharedFeeds = Arc<Mutex<Vec<PodcastFeed>>>;

/// Ages (in seconds) steering one check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckParams {
    /// Max episode age accepted on the very first check of a feed
    pub initial_check_age: i64,
    /// Forces (re)announcement of episodes younger than this
    pub max_age: Option<i64>,
}

pub struct FeedChecker {
    feeds: SharedFeeds,
    state: Arc<Mutex<BotState>>,
    broadcaster: Broadcaster,
}

impl FeedChecker {
    pub fn new(feeds: SharedFeeds, state: Arc<Mutex<BotState>>, broadcaster: Broadcaster) -> Self {
        Self {
            feeds,
            state,
            broadcaster,
        }
    }

    /// Checker whose state is never written to disk.
    pub fn preview(feeds: SharedFeeds, broadcaster: Broadcaster) -> Self {
        Self::new(feeds, Arc::new(Mutex::new(BotState::default())), broadcaster)
    }

    /// Checks all feeds once and returns the number of announced episodes.
    pub async fn check_feeds(&self, params: CheckParams) -> usize {
        let mut feeds = self.feeds.lock().await;
        let mut announced = 0;

        for feed in feeds.iter_mut() {
            tracing::info!("Periodic check for {} ({})", feed.title(), feed.url());
            let found = match feed
                .check_new_episode(params.initial_check_age, params.max_age, Utc::now())
                .await
            {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!("Check of {} failed: {:#}", feed.url(), e);
                    continue;
                }
            };
            tracing::info!(
                "Checked for new episode: {}. Latest episode is: {}",
                found,
                feed.latest_episode().map(|e| e.title.as_str()).unwrap_or_default()
            );

            {
                let mut state = self.state.lock().await;
                let feed_state = state.get_feed_state(feed.url());
                feed_state.last_checked_title = feed.last_checked_title().map(str::to_string);
                if found {
                    feed_state.last_announced_at = Some(Utc::now().timestamp());
                }
            }

            if found {
                let feed = &*feed;
                let sent = self
                    .broadcaster
                    .broadcast(|markup| feed.build_message(0, true, markup))
                    .await;
                tracing::info!("Announced new episode of {} to {} chats", feed.title(), sent);
                announced += 1;
            }
        }

        self.state.lock().await.save();
        announced
    }

    /// Runs `check_feeds` every `interval` after an initial `first_delay`.
    pub async fn run_periodic(self: Arc<Self>, first_delay: Duration, interval: Duration, initial_check_age: i64) {
        tokio::time::sleep(first_delay).await;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.check_feeds(CheckParams {
                initial_check_age,
                max_age: None,
            })
            .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::markup::Markup;
    use crate::domain::traits::ChatProvider;
    use crate::testing::{RecordingChat, StaticFeedSource, episode, snapshot};

    const A: &str = "http://a/feed";
    const B: &str = "http://b/feed";

    async fn setup() -> (FeedChecker, Arc<StaticFeedSource>, Arc<RecordingChat>, Arc<Mutex<BotState>>) {
        let recent = Utc::now().to_rfc2822();
        let source = Arc::new(StaticFeedSource::default());
        source.set(A, snapshot("Feed A", vec![episode("A2", &recent)]));
        source.set(B, snapshot("Feed B", vec![episode("B1", "Mon, 01 Jan 2024 10:00:00 +0000")]));

        let feeds = vec![
            PodcastFeed::load(A, 3600, None, source.clone()).await.unwrap(),
            PodcastFeed::load(B, 3600, None, source.clone()).await.unwrap(),
        ];
        let chat = Arc::new(RecordingChat::new(Markup::TelegramV2));
        let targets: Vec<Arc<dyn ChatProvider>> = vec![chat.clone()];
        let state = Arc::new(Mutex::new(BotState::default()));
        let checker = FeedChecker::new(Arc::new(Mutex::new(feeds)), state.clone(), Broadcaster::new(targets));
        (checker, source, chat, state)
    }

    const PERIODIC: CheckParams = CheckParams {
        initial_check_age: 3600,
        max_age: None,
    };

    #[tokio::test]
    async fn announces_only_recent_episodes_on_first_check() {
        let (checker, _, chat, state) = setup().await;
        assert_eq!(checker.check_feeds(PERIODIC).await, 1);

        let messages = chat.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("*A2*"));

        let state = state.lock().await;
        assert_eq!(state.last_checked_title(A).as_deref(), Some("A2"));
        assert_eq!(state.last_checked_title(B).as_deref(), Some("B1"));
    }

    #[tokio::test]
    async fn second_check_is_quiet_until_title_changes() {
        let (checker, source, chat, _) = setup().await;
        checker.check_feeds(PERIODIC).await;
        assert_eq!(checker.check_feeds(PERIODIC).await, 0);

        source.set(B, snapshot("Feed B", vec![episode("B2", "Tue, 02 Jan 2024 10:00:00 +0000")]));
        assert_eq!(checker.check_feeds(PERIODIC).await, 1);
        assert!(chat.messages().last().unwrap().starts_with("*B2*"));
    }

    #[tokio::test]
    async fn unreachable_feed_does_not_stop_the_others() {
        let (checker, source, chat, _) = setup().await;
        source.remove(B);
        assert_eq!(checker.check_feeds(PERIODIC).await, 1);
        assert_eq!(chat.messages().len(), 1);
    }

    #[tokio::test]
    async fn preview_leaves_state_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = BotState::path_in(dir.path());
        {
            let mut state = BotState::load(&path);
            state.get_feed_state(B).last_checked_title = Some("B0".to_string());
            state.save();
        }
        let before = std::fs::read_to_string(&path).unwrap();

        let source = Arc::new(StaticFeedSource::with(
            B,
            snapshot("Feed B", vec![episode("B1", "Mon, 01 Jan 2024 10:00:00 +0000")]),
        ));
        let state = BotState::load(&path);
        let mut feed = PodcastFeed::load(B, 3600, None, source).await.unwrap();
        feed.set_last_checked_title(state.last_checked_title(B));

        let chat = Arc::new(RecordingChat::new(Markup::Markdown));
        let targets: Vec<Arc<dyn ChatProvider>> = vec![chat.clone()];
        let checker = FeedChecker::preview(Arc::new(Mutex::new(vec![feed])), Broadcaster::new(targets));

        assert_eq!(checker.check_feeds(PERIODIC).await, 1);
        assert!(chat.messages()[0].starts_with("**B1**"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn debug_max_age_reannounces() {
        let (checker, _, chat, _) = setup().await;
        checker.check_feeds(PERIODIC).await;
        let forced = CheckParams {
            initial_check_age: 3600,
            max_age: Some(3600 * 24 * 30),
        };
        assert_eq!(checker.check_feeds(forced).await, 1);
        assert_eq!(chat.messages().len(), 2);
    }
}

//! # Search Commands
//!
//! Handles `/findeStichwort [n] term` and `/themenVonFolgeX n`.

use crate::application::input::{command_args, parse_input};
use crate::application::scheduler::SharedFeeds;
use crate::application::search::fuzzy_topic_search;
use crate::application::topics::topics_of_episode;
use crate::domain::markup;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;
use anyhow::Result;

pub async fn handle_search(feeds: &SharedFeeds, chat: &impl ChatProvider, text: &str) -> Result<()> {
    let mut feeds = feeds.lock().await;
    let (index, term) = parse_input(text, feeds.len());
    if term.is_empty() {
        return super::reply_text(chat, messages::SEARCH_USAGE).await;
    }
    let Some(feed) = feeds.get_mut(index) else {
        return Ok(());
    };
    feed.refresh_or_cached().await;

    let hits = fuzzy_topic_search(feed.snapshot(), &term);
    if hits.is_empty() {
        return super::reply_text(chat, messages::SEARCH_NO_HITS).await;
    }
    let text = format!("{}\n{}", messages::SEARCH_HITS_HEADER, hits.join("\n"));
    super::reply_text(chat, &text).await
}

/// Topics of an episode of the main feed.
pub async fn handle_topics(feeds: &SharedFeeds, chat: &impl ChatProvider, text: &str) -> Result<()> {
    let mut feeds = feeds.lock().await;
    let Some(feed) = feeds.first_mut() else {
        return Ok(());
    };
    feed.refresh_or_cached().await;

    let reply = topics_of_episode(feed.snapshot(), command_args(text).unwrap_or_default(), chat.markup());
    super::reply(chat, &reply).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::feed::PodcastFeed;
    use crate::domain::markup::Markup;
    use crate::testing::{RecordingChat, StaticFeedSource, episode, snapshot};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    async fn feeds() -> SharedFeeds {
        let mut episodes = vec![
            episode("Mi2: Kekse", "Tue, 02 Jan 2024 10:00:00 +0000"),
            episode("Mi1: Krähen", "Mon, 01 Jan 2024 10:00:00 +0000"),
            episode("Mi0: Anfang", "Sun, 31 Dec 2023 10:00:00 +0000"),
        ];
        episodes[1].content = "<p><strong>Thema 1: Krähen zählen.</strong></p>\n".to_string();
        let source = Arc::new(StaticFeedSource::with(
            "http://a/feed",
            snapshot("Methodisch inkorrekt!", episodes),
        ));
        let feed = PodcastFeed::load("http://a/feed", 3600, None, source).await.unwrap();
        Arc::new(Mutex::new(vec![feed]))
    }

    #[tokio::test]
    async fn search_without_term_shows_usage() {
        let chat = RecordingChat::new(Markup::TelegramV2);
        handle_search(&feeds().await, &chat, "/findeStichwort").await.unwrap();
        assert_eq!(
            chat.messages(),
            vec![markup::escape(Markup::TelegramV2, messages::SEARCH_USAGE)]
        );
    }

    #[tokio::test]
    async fn search_lists_best_hits() {
        let chat = RecordingChat::new(Markup::Markdown);
        handle_search(&feeds().await, &chat, "/findeStichwort 1 zählen").await.unwrap();
        let reply = &chat.messages()[0];
        assert!(reply.starts_with("Die besten 3 Treffer sind die Episoden:\nMi1: Krähen\n"));
    }

    #[tokio::test]
    async fn topics_by_episode_number() {
        let chat = RecordingChat::new(Markup::TelegramV2);
        handle_topics(&feeds().await, &chat, "/themenVonFolgeX 1").await.unwrap();
        assert_eq!(
            chat.messages(),
            vec!["Die Themen von Folge Mi1: Krähen sind:\nThema 1: Krähen zählen\\."]
        );
    }
}

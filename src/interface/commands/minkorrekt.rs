//! # Methodisch inkorrekt Extras
//!
//! `/keks` and `/crowsay`, only registered when the main feed is Minkorrekt.

use crate::application::input::command_args;
use crate::application::scheduler::SharedFeeds;
use crate::domain::markup;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::tools::ToolRunner;
use crate::strings::messages;
use anyhow::Result;
use rand::seq::SliceRandom;

/// Sends a random episode title of the main feed as a cookie.
pub async fn handle_cookie(feeds: &SharedFeeds, chat: &impl ChatProvider) -> Result<()> {
    let titles = {
        let mut feeds = feeds.lock().await;
        match feeds.first_mut() {
            Some(feed) => feed.episode_titles().await,
            None => Vec::new(),
        }
    };

    let title = titles.choose(&mut rand::thread_rng()).cloned();
    let Some(title) = title else {
        return super::reply_text(chat, messages::COOKIE_CRUMBS).await;
    };
    chat.send_plain(&messages::cookie(&title))
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

/// The crow says the given text, or a fortune when none is given.
pub async fn handle_crowsay(tools: &ToolRunner, chat: &impl ChatProvider, text: &str) -> Result<()> {
    let said = match command_args(text) {
        Some(args) => Ok(args.trim().to_string()),
        None => tools.fortune().await,
    };
    let crow = match said {
        Ok(said) => tools.cowsay(&said).await,
        Err(e) => Err(e),
    };

    match crow {
        Ok(crow) => super::reply(chat, &markup::code_block(chat.markup(), crow.trim_end())).await,
        Err(e) => {
            tracing::warn!("crowsay failed: {:#}", e);
            super::reply_text(chat, messages::CROW_SILENT).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::feed::PodcastFeed;
    use crate::domain::config::ToolsConfig;
    use crate::domain::markup::Markup;
    use crate::testing::{RecordingChat, StaticFeedSource, episode, snapshot};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    async fn feeds(titles: &[&str]) -> SharedFeeds {
        let episodes = titles
            .iter()
            .map(|t| episode(t, "Mon, 01 Jan 2024 10:00:00 +0000"))
            .collect();
        let source = Arc::new(StaticFeedSource::with("http://a/feed", snapshot("Methodisch inkorrekt!", episodes)));
        let feed = PodcastFeed::load("http://a/feed", 3600, None, source).await.unwrap();
        Arc::new(Mutex::new(vec![feed]))
    }

    #[tokio::test]
    async fn cookie_is_an_episode_title() {
        let chat = RecordingChat::new(Markup::TelegramV2);
        handle_cookie(&feeds(&["Mi1 Kekse", "Mi2 Krümel"]).await, &chat).await.unwrap();

        let sent = chat.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0] == messages::cookie("Mi1 Kekse") || sent[0] == messages::cookie("Mi2 Krümel"));
    }

    #[tokio::test]
    async fn no_cookies_in_empty_feed() {
        let chat = RecordingChat::new(Markup::Markdown);
        handle_cookie(&feeds(&[]).await, &chat).await.unwrap();
        assert_eq!(chat.messages(), vec![markup::escape(Markup::Markdown, messages::COOKIE_CRUMBS)]);
    }

    #[tokio::test]
    async fn crow_repeats_given_text() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolsConfig {
            cowsay: "echo".to_string(),
            cow_file: Some("crow.cow".to_string()),
            ..ToolsConfig::default()
        };
        let tools = ToolRunner::new(&config, dir.path());
        let chat = RecordingChat::new(Markup::Markdown);

        handle_crowsay(&tools, &chat, "/crowsay Krah krah").await.unwrap();
        assert_eq!(chat.messages(), vec!["```\n-f crow.cow -- Krah krah\n```"]);
    }

    #[tokio::test]
    async fn silent_crow_without_tools() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolsConfig {
            fortune: "false".to_string(),
            ..ToolsConfig::default()
        };
        let tools = ToolRunner::new(&config, dir.path());
        let chat = RecordingChat::new(Markup::TelegramV2);

        handle_crowsay(&tools, &chat, "/crowsay").await.unwrap();
        assert_eq!(chat.messages(), vec![markup::escape(Markup::TelegramV2, messages::CROW_SILENT)]);
    }
}

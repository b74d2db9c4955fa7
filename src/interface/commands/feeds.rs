//! # Feed Commands
//!
//! Handles `/feeds` (list all watched feeds) and `/letzteEpisode [n]`.

use crate::application::input::parse_input;
use crate::application::scheduler::SharedFeeds;
use crate::domain::markup;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;
use anyhow::Result;

pub async fn handle_feeds(feeds: &SharedFeeds, chat: &impl ChatProvider) -> Result<()> {
    let m = chat.markup();
    let feeds = feeds.lock().await;

    let mut msg = format!("{}\n", markup::escape(m, messages::FEEDS_HEADER));
    for (i, feed) in feeds.iter().enumerate() {
        msg.push_str(&format!(
            "{} \\- {} \\({} {}\\)\n",
            i + 1,
            markup::escape(m, feed.title()),
            markup::link(m, "Webseite", feed.site_link()),
            markup::link(m, "Feed", feed.url())
        ));
    }
    super::reply(chat, msg.trim_end()).await
}

pub async fn handle_latest(feeds: &SharedFeeds, chat: &impl ChatProvider, text: &str) -> Result<()> {
    let mut feeds = feeds.lock().await;
    let (index, _) = parse_input(text, feeds.len());
    let Some(feed) = feeds.get_mut(index) else {
        return Ok(());
    };
    feed.refresh_or_cached().await;

    match feed.build_message(0, false, chat.markup()) {
        Some(msg) => super::reply(chat, &msg).await,
        None => super::reply_text(chat, messages::NO_EPISODES).await,
    }
}

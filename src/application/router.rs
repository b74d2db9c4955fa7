//! # Command Router
//!
//! Routes incoming messages to the appropriate command handler (in `interface/commands`).
//! Commands start with `/` or `.`, are matched case-insensitively and may carry
//! a `@botname` suffix. Anything else is ignored.

use anyhow::Result;
use std::sync::Arc;

use crate::application::input::command_name;
use crate::application::scheduler::{FeedChecker, SharedFeeds};
use crate::domain::config::CheckConfig;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::tools::ToolRunner;
use crate::interface::commands;

/// Title fragment of the main feed that unlocks the Minkorrekt commands.
pub const MINKORREKT_TITLE: &str = "Methodisch inkorrekt";

pub struct CommandRouter {
    feeds: SharedFeeds,
    tools: ToolRunner,
    checker: Arc<FeedChecker>,
    check: CheckConfig,
    minkorrekt: bool,
    debug: bool,
}

impl CommandRouter {
    pub async fn new(
        feeds: SharedFeeds,
        tools: ToolRunner,
        checker: Arc<FeedChecker>,
        check: CheckConfig,
        debug: bool,
    ) -> Self {
        let minkorrekt = feeds
            .lock()
            .await
            .first()
            .is_some_and(|feed| feed.title().contains(MINKORREKT_TITLE));
        tracing::info!("{}", crate::strings::logs::minkorrekt_mode(minkorrekt));
        Self {
            feeds,
            tools,
            checker,
            check,
            minkorrekt,
            debug,
        }
    }

    pub async fn route<C>(&self, chat: &C, message: &str, sender: &str) -> Result<()>
    where
        C: ChatProvider,
    {
        let Some(command) = command_name(message) else {
            return Ok(());
        };
        tracing::debug!("Command `{}` from {} in {}", command, sender, chat.room_id());

        match command.as_str() {
            "help" | "start" => commands::help::handle_help(chat, self.minkorrekt, self.debug).await,
            "feeds" => commands::feeds::handle_feeds(&self.feeds, chat).await,
            "letzteepisode" => commands::feeds::handle_latest(&self.feeds, chat, message).await,
            "findestichwort" => commands::search::handle_search(&self.feeds, chat, message).await,
            "themenvonfolgex" if self.minkorrekt => {
                commands::search::handle_topics(&self.feeds, chat, message).await
            }
            "keks" if self.minkorrekt => commands::minkorrekt::handle_cookie(&self.feeds, chat).await,
            "crowsay" if self.minkorrekt => {
                commands::minkorrekt::handle_crowsay(&self.tools, chat, message).await
            }
            "debugnewepisode" if self.debug => {
                commands::debug::handle_debug_check(&self.checker, &self.check, chat, message).await
            }
            _ => Ok(()),
        }
    }
}

//! # Command Handlers
//!
//! Contains specific handler functions for each supported command
//! (e.g. /feeds, /letzteEpisode, /findeStichwort). These handlers are invoked by the Router.

pub mod debug;
pub mod feeds;
pub mod help;
pub mod minkorrekt;
pub mod search;

use crate::domain::traits::ChatProvider;
use anyhow::Result;

/// Sends an already formatted message.
pub(crate) async fn reply(chat: &impl ChatProvider, text: &str) -> Result<()> {
    chat.send_message(text).await.map(|_| ()).map_err(|e| anyhow::anyhow!(e))
}

/// Escapes plain text for the chat and sends it.
pub(crate) async fn reply_text(chat: &impl ChatProvider, text: &str) -> Result<()> {
    reply(chat, &crate::domain::markup::escape(chat.markup(), text)).await
}

//! # Domain Traits
//!
//! Abstract interfaces for the chat transports and the feed download.
//! Allows for pluggable implementations in the Infrastructure layer.

use crate::domain::markup::Markup;
use crate::domain::types::FeedSnapshot;
use async_trait::async_trait;

/// Abstract interface for a Chat Provider (e.g., Telegram, Matrix)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a formatted message to the chat
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// Send a message without any markup parsing
    async fn send_plain(&self, content: &str) -> Result<(), String>;

    /// Get the current chat ID
    fn room_id(&self) -> String;

    /// Markup dialect the chat renders
    fn markup(&self) -> Markup;
}

/// Source of parsed feed snapshots
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<FeedSnapshot>;
}

//! # Console Chat
//!
//! Prints messages to stdout. Used by `--once` to preview announcements
//! without sending them anywhere.

use crate::domain::markup::Markup;
use crate::domain::traits::ChatProvider;
use async_trait::async_trait;
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct ConsoleChat;

impl ConsoleChat {
    fn print(&self, content: &str) -> Result<(), String> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{content}\n").map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ChatProvider for ConsoleChat {
    async fn send_message(&self, content: &str) -> Result<String, String> {
        self.print(content).map(|_| "console".to_string())
    }

    async fn send_plain(&self, content: &str) -> Result<(), String> {
        self.print(content)
    }

    fn room_id(&self) -> String {
        "console".to_string()
    }

    fn markup(&self) -> Markup {
        Markup::Markdown
    }
}

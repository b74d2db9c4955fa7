//! # Broadcaster
//!
//! Sends announcements to every configured chat on every transport.
//! The message is rendered once per markup dialect.

use crate::domain::markup::Markup;
use crate::domain::traits::ChatProvider;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Broadcaster {
    targets: Vec<Arc<dyn ChatProvider>>,
}

impl Broadcaster {
    pub fn new(targets: Vec<Arc<dyn ChatProvider>>) -> Self {
        Self { targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Sends the rendered message to all targets and returns how many succeeded.
    /// A failing chat is logged and does not stop the others.
    pub async fn broadcast<F>(&self, render: F) -> usize
    where
        F: Fn(Markup) -> Option<String>,
    {
        let mut rendered: HashMap<Markup, Option<String>> = HashMap::new();
        for target in &self.targets {
            let markup = target.markup();
            rendered.entry(markup).or_insert_with(|| render(markup));
        }

        let sends = self.targets.iter().filter_map(|target| {
            let text = rendered.get(&target.markup()).cloned().flatten()?;
            Some(async move {
                match target.send_message(&text).await {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::error!("Broadcast to {} failed: {}", target.room_id(), e);
                        false
                    }
                }
            })
        });

        join_all(sends).await.into_iter().filter(|ok| *ok).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingChat;

    #[tokio::test]
    async fn renders_per_markup_and_survives_failures() {
        let telegram = Arc::new(RecordingChat::new(Markup::TelegramV2));
        let matrix = Arc::new(RecordingChat::new(Markup::Markdown));
        let broken = Arc::new(RecordingChat::failing());
        let targets: Vec<Arc<dyn ChatProvider>> = vec![telegram.clone(), broken, matrix.clone()];
        let broadcaster = Broadcaster::new(targets);

        let sent = broadcaster
            .broadcast(|m| Some(crate::domain::markup::bold(m, "Neu")))
            .await;

        assert_eq!(sent, 2);
        assert_eq!(telegram.messages(), vec!["*Neu*"]);
        assert_eq!(matrix.messages(), vec!["**Neu**"]);
    }

    #[tokio::test]
    async fn nothing_rendered_nothing_sent() {
        let chat = Arc::new(RecordingChat::new(Markup::TelegramV2));
        let targets: Vec<Arc<dyn ChatProvider>> = vec![chat.clone()];
        let broadcaster = Broadcaster::new(targets);
        assert_eq!(broadcaster.broadcast(|_| None).await, 0);
        assert!(chat.messages().is_empty());
    }
}

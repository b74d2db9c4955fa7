//! # Telegram Service Adapter
//!
//! Minimal Telegram Bot API client (long polling + `sendMessage`) and the
//! `ChatProvider` implementation for a single Telegram chat.

use crate::application::router::CommandRouter;
use crate::domain::config::TelegramConfig;
use crate::domain::markup::Markup;
use crate::domain::traits::ChatProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Bot API envelope: `{"ok": .., "result": .., "description": ..}`
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    disable_web_page_preview: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

pub struct TelegramClient {
    http: Client,
    base_url: String,
    poll_timeout: u64,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        // Long polls must outlive the server-side timeout.
        let http = Client::builder()
            .http1_only()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()
            .context("Failed to build Telegram HTTP client")?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", config.api_url.trim_end_matches('/'), config.token),
            poll_timeout: config.poll_timeout_secs,
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Telegram {method} request failed"))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Telegram {method} returned invalid JSON"))?;
        unwrap_envelope(method, envelope)
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn send_message(&self, chat_id: &str, text: &str, parse_mode: Option<&str>) -> Result<i64> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
            disable_web_page_preview: false,
        };
        let sent: SentMessage = self.call("sendMessage", &request).await?;
        Ok(sent.message_id)
    }
}

fn unwrap_envelope<T>(method: &str, envelope: ApiResponse<T>) -> Result<T> {
    match envelope {
        ApiResponse { ok: true, result: Some(result), .. } => Ok(result),
        ApiResponse { description, .. } => anyhow::bail!(
            "Telegram {} failed: {}",
            method,
            description.unwrap_or_else(|| "no description".to_string())
        ),
    }
}

/// A single Telegram chat.
#[derive(Clone)]
pub struct TelegramChat {
    client: Arc<TelegramClient>,
    chat_id: String,
}

impl TelegramChat {
    pub fn new(client: Arc<TelegramClient>, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for TelegramChat {
    fn room_id(&self) -> String {
        self.chat_id.clone()
    }

    fn markup(&self) -> Markup {
        Markup::TelegramV2
    }

    async fn send_message(&self, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", self.chat_id, content);
        self.client
            .send_message(&self.chat_id, content, Some("MarkdownV2"))
            .await
            .map(|id| id.to_string())
            .map_err(|e| format!("{e:#}"))
    }

    async fn send_plain(&self, content: &str) -> Result<(), String> {
        self.client
            .send_message(&self.chat_id, content, None)
            .await
            .map(|_| ())
            .map_err(|e| format!("{e:#}"))
    }
}

/// Long-polling loop feeding incoming messages to the router.
pub struct TelegramService {
    client: Arc<TelegramClient>,
}

impl TelegramService {
    pub fn new(client: Arc<TelegramClient>) -> Self {
        Self { client }
    }

    pub async fn run(self, router: Arc<CommandRouter>) {
        tracing::info!("{}", crate::strings::logs::POLLING_START);
        let mut offset = 0;
        loop {
            let updates = match self.client.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!("{}", crate::strings::logs::polling_failed(&format!("{e:#}")));
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(message) = update.message else {
                    continue;
                };
                let Some(text) = message.text.as_deref() else {
                    continue;
                };
                if message.from.as_ref().is_some_and(|u| u.is_bot) {
                    continue;
                }
                let sender = message
                    .from
                    .as_ref()
                    .map(|u| u.username.clone().unwrap_or_else(|| u.id.to_string()))
                    .unwrap_or_default();
                tracing::info!("Received message from {}: \n{}", sender, text);

                let chat = TelegramChat::new(self.client.clone(), message.chat.id.to_string());
                if let Err(e) = router.route(&chat, text, &sender).await {
                    tracing::error!("Failed to route message: {:#}", e);
                }
            }
        }
    }
}

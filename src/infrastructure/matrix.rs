//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`.
//! Rooms are resolved on every send, so broadcast targets configured by ID work
//! before the first sync has populated the room list.

use crate::application::router::CommandRouter;
use crate::domain::config::MatrixConfig;
use crate::domain::markup::Markup;
use crate::domain::traits::ChatProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::{
        OwnedRoomId, RoomId,
        events::room::{
            member::{MembershipState, StrippedRoomMemberEvent},
            message::{MessageType, RoomMessageEventContent, SyncRoomMessageEvent},
        },
    },
};
use std::sync::Arc;

#[derive(Clone)]
pub struct MatrixService {
    client: Client,
    room_id: OwnedRoomId,
}

impl MatrixService {
    pub fn new(client: Client, room_id: OwnedRoomId) -> Self {
        Self { client, room_id }
    }

    /// Target for a configured room ID string.
    pub fn for_room(client: Client, room_id: &str) -> Result<Self> {
        let room_id = RoomId::parse(room_id).with_context(|| format!("Invalid Matrix room ID {room_id}"))?;
        Ok(Self::new(client, room_id))
    }

    fn room(&self) -> Result<Room, String> {
        self.client
            .get_room(&self.room_id)
            .ok_or_else(|| format!("Room {} is not joined", self.room_id))
    }

    async fn send(&self, content: RoomMessageEventContent) -> Result<String, String> {
        self.room()?
            .send(content)
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room_id.as_str().to_string()
    }

    fn markup(&self) -> Markup {
        Markup::Markdown
    }

    async fn send_message(&self, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), content);
        self.send(RoomMessageEventContent::text_markdown(content)).await
    }

    async fn send_plain(&self, content: &str) -> Result<(), String> {
        self.send(RoomMessageEventContent::text_plain(content)).await.map(|_| ())
    }
}

/// Logs in and returns the connected client.
pub async fn connect(config: &MatrixConfig) -> Result<Client> {
    let client = Client::builder()
        .homeserver_url(&config.homeserver)
        .build()
        .await
        .context("Failed to build Matrix client")?;

    client
        .matrix_auth()
        .login_username(&config.username, &config.password)
        .send()
        .await
        .context("Matrix login failed")?;

    tracing::info!("{}", crate::strings::logs::matrix_logged_in(&config.username));
    Ok(client)
}

/// Registers the event handlers and runs the sync loop until it fails.
pub async fn run(client: Client, router: Arc<CommandRouter>) -> Result<()> {
    let start_time = std::time::SystemTime::now();
    let handler_client = client.clone();

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let router = router.clone();
        let client = handler_client.clone();
        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };
            // Ignore events older than start_time
            let ts = ev.origin_server_ts();
            let event_time = std::time::UNIX_EPOCH + std::time::Duration::from_millis(ts.get().into());
            if event_time < start_time {
                return;
            }
            if original_msg.sender == room.own_user_id() {
                return;
            }
            if let MessageType::Text(text_content) = &original_msg.content.msgtype {
                let body = &text_content.body;
                tracing::info!("Received message from {}: \n{}", original_msg.sender, body);
                let chat = MatrixService::new(client, room.room_id().to_owned());
                if let Err(e) = router.route(&chat, body, original_msg.sender.as_str()).await {
                    tracing::error!("Failed to route message: {:#}", e);
                }
            }
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            tracing::info!("{}", crate::strings::logs::invite_received(room.room_id().as_str()));
            if let Err(e) = room.join().await {
                tracing::warn!("Failed to join {}: {}", room.room_id(), e);
            }
        }
    });

    tracing::info!("{}", crate::strings::logs::SYNC_LOOP_START);
    client
        .sync(SyncSettings::default())
        .await
        .context("Matrix sync loop failed")
}

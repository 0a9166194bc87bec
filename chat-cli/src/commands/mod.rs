//! Subcommand implementations.

pub mod delete;
pub mod edit;
pub mod history;
pub mod init;
pub mod peers;
pub mod send;
pub mod watch;

use anyhow::{Context, Result};
use chat_client::{HttpRemoteApi, MessageStore, SyncChannel, WsChannel};
use chat_types::Message;

use crate::config::ClientConfig;

/// Build the store for a command.
///
/// REST-only commands leave the channel disconnected; commands that publish
/// (edit, delete) or consume (watch) pass `connect_channel`.
pub(crate) async fn build_store(
    config: &ClientConfig,
    connect_channel: bool,
) -> Result<MessageStore<HttpRemoteApi, WsChannel>> {
    let mut api = HttpRemoteApi::new(&config.server_url);
    if let Some(token) = &config.auth_token {
        api = api.with_auth_token(token);
    }

    let channel = WsChannel::new();
    if connect_channel {
        channel
            .connect(&config.channel_url)
            .await
            .context("Failed to connect to the sync channel")?;
    }

    Ok(MessageStore::new(api, channel))
}

/// Render one message as a history line.
pub(crate) fn format_message(message: &Message, me: Option<&str>) -> String {
    let direction = match me {
        Some(me) if message.sender_id.as_str() == me => "->".to_string(),
        _ => format!("<- {}", message.sender_id),
    };
    let body = match (message.display_text(), &message.image) {
        (Some(text), Some(_)) => format!("{text} [image]"),
        (Some(text), None) => text.to_string(),
        (None, Some(_)) => "[image]".to_string(),
        (None, None) => String::new(),
    };
    let edited = if message.content.is_some() {
        " (edited)"
    } else {
        ""
    };
    format!(
        "{}  {}  {} {}{}",
        message.id,
        message.created_at.format("%Y-%m-%d %H:%M:%S"),
        direction,
        body,
        edited
    )
}

//! Print the conversation with a peer.

use anyhow::Result;
use std::path::Path;

use chat_types::UserId;

use crate::commands::{build_store, format_message};
use crate::config::ClientConfig;

/// Run the history command.
pub async fn run(data_dir: &Path, peer: &str) -> Result<()> {
    let config = ClientConfig::load(data_dir).await?;
    let store = build_store(&config, false).await?;
    let peer = UserId::from(peer);

    store.select_conversation(&peer).await;
    store.load_messages(&peer).await?;

    let messages = store.messages().await;
    if messages.is_empty() {
        println!("No messages with {peer} yet.");
        return Ok(());
    }

    for message in &messages {
        println!("{}", format_message(message, config.user_id.as_deref()));
    }
    Ok(())
}

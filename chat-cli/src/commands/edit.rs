//! Edit a message's content.

use anyhow::Result;
use std::path::Path;

use chat_types::MessageId;

use crate::commands::build_store;
use crate::config::ClientConfig;

/// Run the edit command.
pub async fn run(data_dir: &Path, message_id: &str, content: &str) -> Result<()> {
    let config = ClientConfig::load(data_dir).await?;
    // Editing publishes a notification, so the channel must be up.
    let store = build_store(&config, true).await?;

    store
        .edit_message(&MessageId::from(message_id), content)
        .await?;

    println!("Edited {message_id}");
    Ok(())
}

//! Delete a message.

use anyhow::Result;
use std::path::Path;

use chat_types::MessageId;

use crate::commands::build_store;
use crate::config::ClientConfig;

/// Run the delete command.
pub async fn run(data_dir: &Path, message_id: &str) -> Result<()> {
    let config = ClientConfig::load(data_dir).await?;
    // Deleting publishes a notification, so the channel must be up.
    let store = build_store(&config, true).await?;

    store.delete_message(&MessageId::from(message_id)).await?;

    println!("Deleted {message_id}");
    Ok(())
}

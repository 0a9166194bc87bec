//! List the users available to chat with.

use anyhow::Result;
use std::path::Path;

use crate::commands::build_store;
use crate::config::ClientConfig;

/// Run the peers command.
pub async fn run(data_dir: &Path) -> Result<()> {
    let config = ClientConfig::load(data_dir).await?;
    let store = build_store(&config, false).await?;

    store.load_users().await?;
    let users = store.users().await;

    if users.is_empty() {
        println!("No peers available.");
        return Ok(());
    }

    for user in users {
        println!("{}  {}", user.id, user.full_name);
    }
    Ok(())
}

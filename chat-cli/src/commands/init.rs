//! Store the backend endpoints and auth token.

use anyhow::Result;
use std::path::Path;

use crate::config::{derive_channel_url, set_dir_permissions_0700, ClientConfig};

/// Run the init command.
pub async fn run(
    data_dir: &Path,
    server: &str,
    channel: Option<&str>,
    token: Option<&str>,
    user_id: Option<&str>,
) -> Result<()> {
    set_dir_permissions_0700(data_dir).await?;

    let channel_url = match channel {
        Some(url) => url.to_string(),
        None => derive_channel_url(server),
    };

    let mut config = ClientConfig::new(server, &channel_url);
    config.auth_token = token.map(String::from);
    config.user_id = user_id.map(String::from);
    config.save(data_dir).await?;

    println!("Configuration saved to {}", data_dir.display());
    println!("  API:     {}", config.server_url);
    println!("  Channel: {}", config.channel_url);
    if config.auth_token.is_some() {
        println!("  Token:   (stored)");
    }
    Ok(())
}

//! Configuration management for chat-cli.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Client configuration stored locally.
///
/// Authentication itself is external; the CLI just stores whatever token
/// the user obtained so it can attach it to requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the RemoteAPI (e.g. `http://localhost:5001/api`).
    pub server_url: String,
    /// URL of the sync channel endpoint (e.g. `ws://localhost:5001/sync`).
    pub channel_url: String,
    /// Bearer token attached to API requests, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Our own user id, used to render message direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// When the configuration was written (unix seconds).
    pub created_at: u64,
}

impl ClientConfig {
    /// Create a new configuration.
    pub fn new(server_url: &str, channel_url: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            channel_url: channel_url.to_string(),
            auth_token: None,
            user_id: None,
            created_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Load the configuration from a directory.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("client.json");
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("Not initialized. Run 'chat-cli init' first.")?;
        serde_json::from_str(&contents).context("Invalid client configuration")
    }

    /// Save the configuration to a directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join("client.json");
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save client configuration")?;
        // The file may carry an auth token; owner-only.
        set_file_permissions_0600(&path).await?;
        Ok(())
    }
}

/// Derive a channel URL from an API base URL: swap the scheme to WebSocket
/// and point at the `/sync` endpoint.
pub fn derive_channel_url(server_url: &str) -> String {
    let ws = if let Some(rest) = server_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = server_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        server_url.to_string()
    };

    // Replace the API path with the channel endpoint.
    match ws.find("://").map(|i| i + 3) {
        Some(host_start) => match ws[host_start..].find('/') {
            Some(path_start) => format!("{}/sync", &ws[..host_start + path_start]),
            None => format!("{ws}/sync"),
        },
        None => ws,
    }
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to set file permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Set directory permissions to 0700 (owner only) on Unix.
/// No-op on non-Unix platforms.
pub async fn set_dir_permissions_0700(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .await
            .context("Failed to set directory permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

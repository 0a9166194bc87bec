//! Send a message to a peer.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

use chat_types::{MessageDraft, UserId};

use crate::commands::build_store;
use crate::config::ClientConfig;

/// Run the send command.
pub async fn run(
    data_dir: &Path,
    peer: &str,
    text: Option<&str>,
    image: Option<&Path>,
) -> Result<()> {
    let config = ClientConfig::load(data_dir).await?;
    let store = build_store(&config, false).await?;
    let peer = UserId::from(peer);

    let draft = MessageDraft {
        text: text.map(String::from),
        image: match image {
            Some(path) => Some(encode_image(path).await?),
            None => None,
        },
    };
    if draft.is_empty() {
        anyhow::bail!("Nothing to send: pass a text body and/or --image");
    }

    store.select_conversation(&peer).await;
    let message = store.send_message(&draft).await?;

    println!("Sent {}", message.id);
    Ok(())
}

/// Read an image file and encode it as a data-URI, the way the web client
/// uploads attachments.
async fn encode_image(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

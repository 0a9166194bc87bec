//! Follow a conversation live.

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use chat_client::{ConversationSession, SyncChannel};
use chat_types::{Message, MessageId, UserId};

use crate::commands::{build_store, format_message};
use crate::config::ClientConfig;

/// Run the watch command: print the history, then follow changes until
/// interrupted.
pub async fn run(data_dir: &Path, peer: &str) -> Result<()> {
    let config = ClientConfig::load(data_dir).await?;
    let store = build_store(&config, true).await?;
    let peer = UserId::from(peer);

    let mut session = ConversationSession::new(store.clone());
    session.switch_to(&peer).await?;

    let me = config.user_id.as_deref();
    let mut seen = snapshot(&store.messages().await);
    for message in store.messages().await.iter() {
        println!("{}", format_message(message, me));
    }
    println!("-- watching {peer}; ctrl-c to stop --");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                let messages = store.messages().await;
                print_changes(&messages, &mut seen, me);
            }
        }
    }

    session.close();
    store.channel().close().await.ok();
    Ok(())
}

fn snapshot(messages: &[Message]) -> HashMap<MessageId, Option<String>> {
    messages
        .iter()
        .map(|m| (m.id.clone(), m.content.clone()))
        .collect()
}

/// Diff the store snapshot against what we last printed and report
/// appends, edits, and deletions.
fn print_changes(
    messages: &[Message],
    seen: &mut HashMap<MessageId, Option<String>>,
    me: Option<&str>,
) {
    for message in messages {
        match seen.get(&message.id) {
            None => println!("{}", format_message(message, me)),
            Some(content) if content != &message.content => {
                println!(
                    "{}  edited: {}",
                    message.id,
                    message.display_text().unwrap_or_default()
                );
            }
            Some(_) => {}
        }
    }

    let current: HashMap<MessageId, Option<String>> = snapshot(messages);
    for id in seen.keys() {
        if !current.contains_key(id) {
            println!("{id}  deleted");
        }
    }
    *seen = current;
}

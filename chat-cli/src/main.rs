//! # chat-cli
//!
//! CLI for exercising the duplex-chat sync engine against a live backend.
//!
//! ## Commands
//!
//! - `init`: Store the backend endpoints and auth token
//! - `peers`: List the users available to chat with
//! - `history`: Print a conversation
//! - `send`: Send a text and/or image message
//! - `edit`: Edit a message's content
//! - `delete`: Delete a message
//! - `watch`: Follow a conversation live
//!
//! ## Example
//!
//! ```bash
//! # Point the CLI at a backend
//! chat-cli init --server http://localhost:5001/api --token $TOKEN --user-id $ME
//!
//! # See who is around and talk to them
//! chat-cli peers
//! chat-cli send 6745a1b2 "hello there"
//! chat-cli watch 6745a1b2
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{delete, edit, history, init, peers, send, watch};

/// CLI for the duplex-chat sync engine.
#[derive(Parser, Debug)]
#[command(name = "chat-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the stored client configuration
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store the backend endpoints and auth token
    Init {
        /// RemoteAPI base URL (e.g. http://localhost:5001/api)
        #[arg(long)]
        server: String,

        /// Sync channel URL (derived from --server when omitted)
        #[arg(long)]
        channel: Option<String>,

        /// Bearer token for API requests
        #[arg(long)]
        token: Option<String>,

        /// Our own user id (used to render message direction)
        #[arg(long)]
        user_id: Option<String>,
    },

    /// List the users available to chat with
    Peers,

    /// Print the conversation with a peer
    History {
        /// The peer's user id
        peer: String,
    },

    /// Send a message to a peer
    Send {
        /// The peer's user id
        peer: String,

        /// Text body
        text: Option<String>,

        /// Image file to attach
        #[arg(long, short)]
        image: Option<PathBuf>,
    },

    /// Edit a message's content
    Edit {
        /// The message id
        message_id: String,

        /// The new content
        content: String,
    },

    /// Delete a message
    Delete {
        /// The message id
        message_id: String,
    },

    /// Follow a conversation live until interrupted
    Watch {
        /// The peer's user id
        peer: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    match cli.command {
        Commands::Init {
            server,
            channel,
            token,
            user_id,
        } => {
            init::run(
                &data_dir,
                &server,
                channel.as_deref(),
                token.as_deref(),
                user_id.as_deref(),
            )
            .await?;
        }
        Commands::Peers => {
            peers::run(&data_dir).await?;
        }
        Commands::History { peer } => {
            history::run(&data_dir, &peer).await?;
        }
        Commands::Send { peer, text, image } => {
            send::run(&data_dir, &peer, text.as_deref(), image.as_deref()).await?;
        }
        Commands::Edit {
            message_id,
            content,
        } => {
            edit::run(&data_dir, &message_id, &content).await?;
        }
        Commands::Delete { message_id } => {
            delete::run(&data_dir, &message_id).await?;
        }
        Commands::Watch { peer } => {
            watch::run(&data_dir, &peer).await?;
        }
    }

    Ok(())
}

/// Get the default data directory for chat-cli.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "duplex", "chat-cli")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

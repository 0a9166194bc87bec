//! # chat-client
//!
//! Client engine for duplex-chat. This is the library applications use to
//! hold conversation state and keep it consistent across sessions.
//!
//! # Architecture
//!
//! ```text
//! Application -> ConversationSession -> MessageStore -> RemoteApi -> HTTP
//!                        |                   |
//!                        +----> SyncChannel <+
//!                              (push events)
//! ```
//!
//! [`MessageStore`] owns the state for the one active conversation and
//! performs CRUD through the [`RemoteApi`] contract, publishing edit/delete
//! notifications on the [`SyncChannel`]. [`ConversationSession`] binds the
//! channel consumer to exactly the active conversation. Pure reconciliation
//! and lifecycle logic live in chat-core; everything here is the I/O shell.
//!
//! # Example
//!
//! ```ignore
//! use chat_client::{ConversationSession, HttpRemoteApi, MessageStore, WsChannel};
//!
//! let api = HttpRemoteApi::new("https://chat.example.com/api");
//! let channel = WsChannel::new();
//! channel.connect("wss://chat.example.com/sync").await?;
//!
//! let store = MessageStore::new(api, channel);
//! let mut session = ConversationSession::new(store.clone());
//! session.switch_to(&peer).await?;
//! store.send_message(&MessageDraft::text("hello")).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod channel;
pub mod session;
pub mod store;

pub use api::{ApiError, HttpRemoteApi, MockRemoteApi, RemoteApi};
pub use channel::{ChannelError, MockChannel, SyncChannel, WsChannel};
pub use session::ConversationSession;
pub use store::{MessageStore, StoreError};

//! # chat-types
//!
//! Wire format types for the duplex-chat message sync protocol.
//!
//! This crate provides the foundational types used across all duplex-chat
//! crates:
//! - [`MessageId`], [`UserId`] - opaque server-assigned identifiers
//! - [`User`], [`Message`], [`MessageDraft`] - the data model
//! - [`ChannelEvent`] - push-channel events (created, edited, deleted)
//! - [`WireError`] - wire format errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod events;
mod ids;
mod model;

pub use error::WireError;
pub use events::ChannelEvent;
pub use ids::{MessageId, UserId};
pub use model::{Message, MessageDraft, User};

//! # chat-core
//!
//! Pure logic for duplex-chat: no I/O, instant tests.
//!
//! Two pieces live here:
//! - [`Conversation`] - the in-memory message list for one peer, and the
//!   reconciliation rules for applying channel events to it
//! - [`SubscriptionState`] - the subscription lifecycle state machine driven
//!   by the session layer
//!
//! The actual I/O (HTTP calls, channel frames) is performed by chat-client,
//! which interprets the actions these types produce.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod conversation;
mod subscription;

pub use conversation::Conversation;
pub use subscription::{SubscriptionAction, SubscriptionEvent, SubscriptionState};

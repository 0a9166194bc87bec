//! RemoteAPI abstraction.
//!
//! This module provides the request/response contract the engine consumes
//! for fetching peers, loading a conversation, and creating/editing/deleting
//! a message. The backend behind it (HTTP service, mock for testing) is
//! pluggable.
//!
//! # Design
//!
//! Every mutation is a full round trip: the store never mutates before the
//! server has answered, so a failed call always leaves state exactly as it
//! was.

mod http;
mod mock;

pub use http::HttpRemoteApi;
pub use mock::MockRemoteApi;

use async_trait::async_trait;
use thiserror::Error;

use chat_types::{Message, MessageDraft, MessageId, User, UserId};

/// RemoteAPI errors.
///
/// Server rejections carry the backend's human-readable `message` field,
/// surfaced to the user verbatim; there are no structured error codes
/// beyond the HTTP status.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never completed (offline, timeout, connection reset).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Human-readable message from the error body.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// The RemoteAPI contract consumed by the engine.
///
/// | operation | method/path |
/// |---|---|
/// | [`fetch_peers`](Self::fetch_peers) | GET `/messages/users` |
/// | [`fetch_messages`](Self::fetch_messages) | GET `/messages/{peer}` |
/// | [`send_message`](Self::send_message) | POST `/messages/send/{peer}` |
/// | [`edit_message`](Self::edit_message) | PUT `/messages/edit/{id}` |
/// | [`delete_message`](Self::delete_message) | DELETE `/messages/delete/{id}` |
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// List the users available to chat with.
    async fn fetch_peers(&self) -> Result<Vec<User>, ApiError>;

    /// Load the full message list of the conversation with `peer`.
    async fn fetch_messages(&self, peer: &UserId) -> Result<Vec<Message>, ApiError>;

    /// Create a message addressed to `peer`. Returns the server's record,
    /// with its assigned id and timestamp.
    async fn send_message(&self, peer: &UserId, draft: &MessageDraft)
        -> Result<Message, ApiError>;

    /// Replace a message's content. Returns the updated record.
    async fn edit_message(&self, id: &MessageId, content: &str) -> Result<Message, ApiError>;

    /// Delete a message.
    async fn delete_message(&self, id: &MessageId) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_displays_the_backend_message_verbatim() {
        let err = ApiError::Server {
            status: 403,
            message: "You cannot edit this message".into(),
        };
        assert_eq!(err.to_string(), "You cannot edit this message");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiError>();
    }
}

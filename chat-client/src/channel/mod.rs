//! Sync channel abstraction.
//!
//! The channel is a persistent, bidirectional, ordered pipe carrying
//! [`ChannelEvent`](chat_types::ChannelEvent) frames between a session and
//! the backend. There is one connection per authenticated session, shared
//! across conversation switches; only one subscription set is active at a
//! time. No acknowledgement, no delivery guarantee beyond the transport's
//! own ordering.
//!
//! # Design
//!
//! The trait is byte-level: implementations move frames, the engine encodes
//! and decodes (and validates) events at this boundary.
//!
//! - `connect()` establishes the connection
//! - `send()` transmits an encoded event frame
//! - `recv()` waits for the next inbound frame
//! - `close()` terminates gracefully

mod mock;
mod ws;

pub use mock::MockChannel;
pub use ws::WsChannel;

use async_trait::async_trait;
use thiserror::Error;

/// Channel errors.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Transport trait for the sync channel.
///
/// Implementations handle the underlying connection mechanism (WebSocket,
/// mock, etc). `send` and `recv` may be called concurrently from different
/// tasks; implementations take `&self` and manage their own interior state.
#[async_trait]
pub trait SyncChannel: Send + Sync {
    /// Connect to the channel endpoint at the given URL.
    async fn connect(&self, url: &str) -> Result<(), ChannelError>;

    /// Send an encoded event frame.
    async fn send(&self, frame: &[u8]) -> Result<(), ChannelError>;

    /// Wait for the next inbound frame.
    ///
    /// Pends until a frame arrives; returns [`ChannelError::ConnectionClosed`]
    /// once the connection is gone.
    async fn recv(&self) -> Result<Vec<u8>, ChannelError>;

    /// Check if currently connected.
    fn is_connected(&self) -> bool;

    /// Close the connection gracefully.
    async fn close(&self) -> Result<(), ChannelError>;
}

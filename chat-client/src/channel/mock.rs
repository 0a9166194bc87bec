//! Mock channel for testing.
//!
//! Captures sent frames and lets tests inject inbound frames. Unlike a
//! request/response mock, `recv` on an empty queue parks until a frame is
//! injected or the channel closes - the sync channel is a push pipe, and an
//! empty queue just means "no event yet".

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{ChannelError, SyncChannel};

/// Mock channel for testing.
#[derive(Debug, Default)]
pub struct MockChannel {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<Inner>,
    notify: Notify,
}

#[derive(Debug, Default)]
struct Inner {
    connected: bool,
    connected_url: Option<String>,
    sent_frames: Vec<Vec<u8>>,
    inbound: VecDeque<Vec<u8>>,
    fail_next_connect: Option<String>,
    fail_next_send: Option<String>,
}

impl MockChannel {
    /// Create a new mock channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame to be returned by a `recv()` call, waking any parked
    /// receiver.
    pub fn queue_frame(&self, frame: Vec<u8>) {
        self.shared
            .state
            .lock()
            .unwrap()
            .inbound
            .push_back(frame);
        self.shared.notify.notify_waiters();
    }

    /// Get all frames that were sent.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.shared.state.lock().unwrap().sent_frames.clone()
    }

    /// Get the last frame that was sent.
    pub fn last_sent(&self) -> Option<Vec<u8>> {
        self.shared.state.lock().unwrap().sent_frames.last().cloned()
    }

    /// Get the URL that was connected to.
    pub fn connected_url(&self) -> Option<String> {
        self.shared.state.lock().unwrap().connected_url.clone()
    }

    /// Cause the next connect() to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        self.shared.state.lock().unwrap().fail_next_connect = Some(error.to_string());
    }

    /// Cause the next send() to fail with the given error.
    pub fn fail_next_send(&self, error: &str) {
        self.shared.state.lock().unwrap().fail_next_send = Some(error.to_string());
    }

    /// Clear all state (frames, queue, connection).
    pub fn reset(&self) {
        *self.shared.state.lock().unwrap() = Inner::default();
        self.shared.notify.notify_waiters();
    }
}

impl Clone for MockChannel {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

#[async_trait]
impl SyncChannel for MockChannel {
    async fn connect(&self, url: &str) -> Result<(), ChannelError> {
        let mut inner = self.shared.state.lock().unwrap();

        if let Some(error) = inner.fail_next_connect.take() {
            return Err(ChannelError::ConnectionFailed(error));
        }

        inner.connected = true;
        inner.connected_url = Some(url.to_string());
        Ok(())
    }

    async fn send(&self, frame: &[u8]) -> Result<(), ChannelError> {
        let mut inner = self.shared.state.lock().unwrap();

        if !inner.connected {
            return Err(ChannelError::NotConnected);
        }

        if let Some(error) = inner.fail_next_send.take() {
            return Err(ChannelError::SendFailed(error));
        }

        inner.sent_frames.push(frame.to_vec());
        Ok(())
    }

    async fn recv(&self) -> Result<Vec<u8>, ChannelError> {
        loop {
            // Register for wakeup before checking, so a frame queued between
            // the check and the await is not missed.
            let notified = self.shared.notify.notified();
            {
                let mut inner = self.shared.state.lock().unwrap();
                if !inner.connected {
                    // Closed after use vs never connected at all.
                    return Err(if inner.connected_url.is_some() {
                        ChannelError::ConnectionClosed
                    } else {
                        ChannelError::NotConnected
                    });
                }
                if let Some(frame) = inner.inbound.pop_front() {
                    return Ok(frame);
                }
            }
            notified.await;
        }
    }

    fn is_connected(&self) -> bool {
        self.shared.state.lock().unwrap().connected
    }

    async fn close(&self) -> Result<(), ChannelError> {
        self.shared.state.lock().unwrap().connected = false;
        self.shared.notify.notify_waiters();
        Ok(())
    }
}

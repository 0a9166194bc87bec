//! WebSocket implementation of the sync channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{ChannelError, SyncChannel};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Sync channel over a WebSocket connection.
///
/// Event frames travel as text frames (they are JSON). The sink and stream
/// halves are guarded separately so a parked `recv` never blocks `send`.
#[derive(Default)]
pub struct WsChannel {
    inner: Arc<WsInner>,
}

#[derive(Default)]
struct WsInner {
    sink: Mutex<Option<SplitSink<WsStream, WsMessage>>>,
    stream: Mutex<Option<SplitStream<WsStream>>>,
    connected: AtomicBool,
}

impl std::fmt::Debug for WsChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsChannel")
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl WsChannel {
    /// Create a disconnected channel; call [`SyncChannel::connect`] before use.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clone for WsChannel {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl SyncChannel for WsChannel {
    async fn connect(&self, url: &str) -> Result<(), ChannelError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| ChannelError::ConnectionFailed(e.to_string()))?;
        tracing::debug!("sync channel connected to {url}");

        let (sink, stream) = stream.split();
        *self.inner.sink.lock().await = Some(sink);
        *self.inner.stream.lock().await = Some(stream);
        self.inner.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, frame: &[u8]) -> Result<(), ChannelError> {
        let text = String::from_utf8(frame.to_vec())
            .map_err(|e| ChannelError::SendFailed(e.to_string()))?;

        let mut guard = self.inner.sink.lock().await;
        let sink = guard.as_mut().ok_or(ChannelError::NotConnected)?;
        sink.send(WsMessage::Text(text))
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))
    }

    async fn recv(&self) -> Result<Vec<u8>, ChannelError> {
        let mut guard = self.inner.stream.lock().await;
        let stream = guard.as_mut().ok_or(ChannelError::NotConnected)?;

        loop {
            match stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return Ok(text.into_bytes()),
                Some(Ok(WsMessage::Binary(bytes))) => return Ok(bytes),
                // Control frames are not events; keep waiting.
                Some(Ok(WsMessage::Ping(_)))
                | Some(Ok(WsMessage::Pong(_)))
                | Some(Ok(WsMessage::Frame(_))) => continue,
                Some(Ok(WsMessage::Close(_))) | None => {
                    self.inner.connected.store(false, Ordering::SeqCst);
                    return Err(ChannelError::ConnectionClosed);
                }
                Some(Err(e)) => {
                    self.inner.connected.store(false, Ordering::SeqCst);
                    return Err(ChannelError::ReceiveFailed(e.to_string()));
                }
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), ChannelError> {
        self.inner.connected.store(false, Ordering::SeqCst);
        let mut guard = self.inner.sink.lock().await;
        if let Some(sink) = guard.as_mut() {
            // Best effort close frame; the connection is going away anyway.
            if let Err(e) = sink.send(WsMessage::Close(None)).await {
                tracing::debug!("close frame not delivered: {e}");
            }
        }
        *guard = None;
        Ok(())
    }
}

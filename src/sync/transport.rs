//! Push-channel transport
//!
//! The connection manager talks to the server through the [`Transport`]
//! seam: `open` yields a [`TransportLink`] that delivers UTF-8 text messages
//! until the connection dies. The production implementation is a websocket
//! client; tests substitute scripted transports.
//!
//! Transport failures are never raised past the connection manager; a
//! failed `open` or a closed link only ever manifests as a state
//! transition and a retry.

use crate::shared::error::SyncError;
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Factory for push-channel connections
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new connection to the push channel
    async fn open(&self) -> Result<Box<dyn TransportLink>, SyncError>;
}

/// One live push-channel connection
#[async_trait]
pub trait TransportLink: Send {
    /// Receive the next text message; `None` means the connection is gone
    async fn recv(&mut self) -> Option<String>;

    /// Close the connection
    async fn close(&mut self);
}

/// Websocket transport over `tokio-tungstenite`
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    url: String,
}

impl WebSocketTransport {
    /// Create a transport connecting to the given websocket URL.
    ///
    /// Reconnection reuses the same URL; the channel path encodes the realm
    /// (site or per-display), see [`crate::shared::config::SyncConfig`].
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self) -> Result<Box<dyn TransportLink>, SyncError> {
        let (stream, _response) = connect_async(&self.url)
            .await
            .map_err(|e| SyncError::transport(e.to_string()))?;
        Ok(Box::new(WebSocketLink { stream }))
    }
}

/// Live websocket connection
struct WebSocketLink {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

#[async_trait]
impl TransportLink for WebSocketLink {
    async fn recv(&mut self) -> Option<String> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(text),
                Ok(Message::Close(_)) => return None,
                // Control and binary frames carry no change batches.
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("[Connection] Websocket receive error: {}", e);
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!("[Connection] Error closing websocket: {}", e);
        }
    }
}

//! Transport seam between the remote client and the socket.
//!
//! [`RemoteClient`](crate::RemoteClient) only talks to the [`Connector`] and
//! [`Connection`] traits. [`WsConnector`] is the real WebSocket
//! implementation on top of `tokio-tungstenite`. Tests plug in scripted
//! connections instead.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::{RemoteError, Result};

/// Opens connections to a channel URL.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `url`. With `relax_tls` set, certificate and hostname
    /// checks are skipped.
    async fn connect(&self, url: &str, relax_tls: bool) -> Result<Box<dyn Connection>>;
}

/// An open, text-framed connection.
#[async_trait]
pub trait Connection: Send {
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Next text frame from the peer, or `None` once the peer has closed.
    async fn next_text(&mut self) -> Result<Option<String>>;

    async fn close(&mut self) -> Result<()>;
}

/// WebSocket connector backed by `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str, relax_tls: bool) -> Result<Box<dyn Connection>> {
        let tls = if relax_tls {
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(|e| RemoteError::connection(url, e.to_string()))?;
            Some(tokio_tungstenite::Connector::NativeTls(connector))
        } else {
            None
        };

        let (stream, response) =
            tokio_tungstenite::connect_async_tls_with_config(url, None, false, tls)
                .await
                .map_err(|e| RemoteError::connection(url, e.to_string()))?;

        debug!("WebSocket upgrade answered with {}", response.status());

        Ok(Box::new(WsConnection {
            url: url.to_string(),
            stream,
        }))
    }
}

struct WsConnection {
    url: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsConnection {
    fn error(&self, reason: impl ToString) -> RemoteError {
        RemoteError::connection(self.url.clone(), reason.to_string())
    }
}

#[async_trait]
impl Connection for WsConnection {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| self.error(e))
    }

    async fn next_text(&mut self) -> Result<Option<String>> {
        while let Some(frame) = self.stream.next().await {
            match frame.map_err(|e| self.error(e))? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Binary(bytes) => {
                    return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Message::Close(_) => return Ok(None),
                // Pings are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.close(None).await.map_err(|e| self.error(e))
    }
}

//! Request/response transport to the aggregator
//!
//! xTeVe keeps no session state between commands, so every exchange opens a
//! fresh websocket, sends one text frame, optionally waits for one reply and
//! closes again.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use crate::errors::{AppError, AppResult};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[async_trait]
pub trait AggregatorTransport: Send + Sync {
    /// Send one message and return the first reply
    async fn request(&self, message: String) -> AppResult<String>;

    /// Send one message without waiting for anything back
    async fn send(&self, message: String) -> AppResult<()>;
}

pub struct WebSocketTransport {
    url: String,
    timeout: Duration,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    async fn connect(&self) -> AppResult<Socket> {
        let (socket, _) = timeout(self.timeout, connect_async(self.url.as_str()))
            .await
            .map_err(|_| AppError::protocol(format!("timed out connecting to {}", self.url)))?
            .map_err(|e| AppError::protocol(format!("failed to connect to {}: {e}", self.url)))?;
        trace!("Aggregator: connected to {}", self.url);
        Ok(socket)
    }

    async fn write(&self, socket: &mut Socket, message: String) -> AppResult<()> {
        debug!("Aggregator: sending {} byte frame", message.len());
        socket
            .send(Message::Text(message))
            .await
            .map_err(|e| AppError::protocol(format!("failed to send to {}: {e}", self.url)))
    }
}

#[async_trait]
impl AggregatorTransport for WebSocketTransport {
    async fn request(&self, message: String) -> AppResult<String> {
        let mut socket = self.connect().await?;
        self.write(&mut socket, message).await?;

        let reply = timeout(self.timeout, read_reply(&mut socket))
            .await
            .map_err(|_| AppError::protocol(format!("timed out waiting for reply from {}", self.url)))??;

        close(socket).await;
        Ok(reply)
    }

    async fn send(&self, message: String) -> AppResult<()> {
        let mut socket = self.connect().await?;
        self.write(&mut socket, message).await?;
        close(socket).await;
        Ok(())
    }
}

async fn read_reply(socket: &mut Socket) -> AppResult<String> {
    while let Some(frame) = socket.next().await {
        let frame = frame.map_err(|e| AppError::protocol(format!("failed to read reply: {e}")))?;
        match frame {
            Message::Text(text) => return Ok(text),
            Message::Binary(bytes) => {
                return String::from_utf8(bytes)
                    .map_err(|e| AppError::protocol(format!("reply is not UTF-8: {e}")));
            }
            Message::Close(frame) => {
                return Err(AppError::protocol(format!(
                    "connection closed before a reply: {frame:?}"
                )));
            }
            // ping, pong and raw frames
            _ => continue,
        }
    }
    Err(AppError::protocol("connection ended before a reply"))
}

// The command has already been delivered; a failed close is not the run's problem
async fn close(mut socket: Socket) {
    if let Err(e) = socket.close(None).await {
        debug!("Aggregator: error closing websocket: {}", e);
    }
}

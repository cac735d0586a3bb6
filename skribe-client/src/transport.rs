//! WebSocket transport for the live session
//!
//! A spawned reader task decodes inbound frames and forwards them over an
//! mpsc channel; the write half sits behind an async mutex. There is no
//! reconnection: once the socket drops the transport stays closed.

use async_trait::async_trait;
use error_common::{Result, SkribeError};
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::protocol::{ClientMessage, ServerMessage};

const INBOUND_BUFFER: usize = 64;

/// Bidirectional message channel to the backend
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, message: &ClientMessage) -> Result<()>;

    /// Next decoded message; `None` once the connection is gone
    async fn recv(&mut self) -> Option<ServerMessage>;

    async fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;
}

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

pub struct WsTransport {
    sink: Arc<Mutex<WsSink>>,
    inbound: mpsc::Receiver<ServerMessage>,
    open: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl WsTransport {
    pub async fn connect(url: &str) -> Result<Self> {
        let (socket, _response) = connect_async(url)
            .await
            .map_err(|e| SkribeError::WebSocketError(format!("failed to connect to {}: {}", url, e)))?;
        info!(url, "WebSocket connected");

        let (sink, mut stream) = socket.split();
        let (tx, inbound) = mpsc::channel(INBOUND_BUFFER);
        let open = Arc::new(AtomicBool::new(true));

        let reader_open = open.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match ServerMessage::from_json(&text) {
                        Ok(message) => {
                            if tx.send(message).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, bytes = text.len(), "Dropping undecodable frame"),
                    },
                    Ok(Message::Close(frame)) => {
                        debug!(?frame, "WebSocket closed by peer");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "WebSocket read failed");
                        break;
                    }
                }
            }
            reader_open.store(false, Ordering::SeqCst);
        });

        Ok(Self {
            sink: Arc::new(Mutex::new(sink)),
            inbound,
            open,
            reader,
        })
    }
}

#[async_trait]
impl MessageTransport for WsTransport {
    async fn send(&self, message: &ClientMessage) -> Result<()> {
        if !self.is_open() {
            return Err(SkribeError::WebSocketError("connection is closed".to_string()));
        }
        let text = message.to_json()?;
        debug!(kind = message.kind(), bytes = text.len(), "Sending frame");
        self.sink
            .lock()
            .await
            .send(Message::Text(text))
            .await
            .map_err(|e| SkribeError::WebSocketError(e.to_string()))
    }

    async fn recv(&mut self) -> Option<ServerMessage> {
        self.inbound.recv().await
    }

    async fn close(&mut self) -> Result<()> {
        if !self.open.swap(false, Ordering::SeqCst) {
            self.reader.abort();
            return Ok(());
        }
        let result = self
            .sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| SkribeError::WebSocketError(e.to_string()));
        self.reader.abort();
        info!("WebSocket closed");
        result
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

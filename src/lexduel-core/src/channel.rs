//! Realtime channel transport.
//!
//! The controller talks to the debate server through the [`DebateChannel`]
//! trait so tests can script event sequences without a socket. The real
//! implementation is a WebSocket carrying `{event, data}` JSON frames.
//!
//! There is deliberately no reconnection, heartbeat, or connect timeout:
//! failure is observed only via explicit error/disconnect signals. Closing
//! or replacing the channel is the only cancellation primitive.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::protocol::{ClientEvent, ServerEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One live bidirectional event channel.
#[async_trait]
pub trait DebateChannel: Send {
    /// Send an outbound named event.
    async fn emit(&mut self, event: ClientEvent) -> Result<(), SessionError>;

    /// Receive the next inbound event, or `None` once the channel is gone
    /// for good.
    async fn next_event(&mut self) -> Option<ServerEvent>;

    /// Close the channel. Safe to call more than once.
    async fn close(&mut self);
}

/// Opens channels; one per session submission.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DebateChannel>, SessionError>;
}

/// WebSocket-backed [`DebateChannel`].
pub struct WsChannel {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
    /// The synthesized `connect` event has been delivered.
    connect_reported: bool,
    /// The stream has ended and `disconnect` has been delivered.
    ended: bool,
}

impl WsChannel {
    fn new(stream: WsStream) -> Self {
        let (write, read) = stream.split();
        Self {
            write,
            read,
            connect_reported: false,
            ended: false,
        }
    }

    fn end(&mut self) -> Option<ServerEvent> {
        if self.ended {
            None
        } else {
            self.ended = true;
            Some(ServerEvent::Disconnect)
        }
    }
}

#[async_trait]
impl DebateChannel for WsChannel {
    async fn emit(&mut self, event: ClientEvent) -> Result<(), SessionError> {
        let frame = event.to_frame()?;
        debug!(%frame, "emitting channel event");
        self.write
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| SessionError::ChannelError(e.to_string()))
    }

    async fn next_event(&mut self) -> Option<ServerEvent> {
        if self.ended {
            return None;
        }
        // The handshake already succeeded when this channel was built;
        // surface that as the first inbound event.
        if !self.connect_reported {
            self.connect_reported = true;
            return Some(ServerEvent::Connect);
        }

        loop {
            match self.read.next().await {
                Some(Ok(Message::Text(text))) => match ServerEvent::from_frame(text.as_str()) {
                    Ok(event) => return Some(event),
                    Err(e) => {
                        // Unknown or malformed frames are skipped, never fatal.
                        warn!(error = %e, frame = %text, "dropping unrecognized frame");
                    }
                },
                Some(Ok(Message::Close(_))) | None => return self.end(),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "channel read error");
                    return self.end();
                }
            }
        }
    }

    async fn close(&mut self) {
        if !self.ended {
            let _ = self.write.send(Message::Close(None)).await;
        }
        let _ = self.write.close().await;
        self.ended = true;
    }
}

/// Connects [`WsChannel`]s to a debate server URL.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    /// Accepts either an `http(s)` or a `ws(s)` URL.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url
            .into()
            .replace("http://", "ws://")
            .replace("https://", "wss://");
        Self { url }
    }
}

#[async_trait]
impl ChannelConnector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn DebateChannel>, SessionError> {
        debug!(url = %self.url, "connecting to debate server");
        let (stream, _) = tokio_tungstenite::connect_async(&self.url)
            .await
            .map_err(|e| SessionError::ChannelError(e.to_string()))?;
        Ok(Box::new(WsChannel::new(stream)))
    }
}

use super::Transport;
use crate::error::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Events the interpreter emits towards the client, named after their wire events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Message(String),
    RequestInput(String),
    Error(String),
    Disconnect,
}

/// Events the client sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    InputResponse(String),
}

/// Emit-style transport over an in-process channel pair.
///
/// The host bridges the [`SocketPeer`] half onto whatever socket library it
/// uses. Replies that arrive while no input request is outstanding are
/// discarded, so each request is resumed by exactly one reply.
pub struct SocketTransport {
    outbound: mpsc::UnboundedSender<ServerEvent>,
    inbound: mpsc::UnboundedReceiver<ClientEvent>,
    closed: bool,
}

/// The host's side of a [`SocketTransport`].
pub struct SocketPeer {
    pub events: mpsc::UnboundedReceiver<ServerEvent>,
    pub replies: mpsc::UnboundedSender<ClientEvent>,
}

impl SocketTransport {
    pub fn channel() -> (SocketTransport, SocketPeer) {
        let (outbound, events) = mpsc::unbounded_channel();
        let (replies, inbound) = mpsc::unbounded_channel();
        (
            SocketTransport {
                outbound,
                inbound,
                closed: false,
            },
            SocketPeer { events, replies },
        )
    }

    fn emit(&mut self, event: ServerEvent) {
        if self.closed {
            return;
        }
        if self.outbound.send(event).is_err() {
            warn!("socket: peer is gone, dropping event");
        }
    }

    fn discard_unsolicited(&mut self) {
        while let Ok(ClientEvent::InputResponse(stale)) = self.inbound.try_recv() {
            debug!(reply = %stale, "socket: discarding reply with no pending request");
        }
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn send_message(&mut self, text: &str) {
        self.emit(ServerEvent::Message(text.to_string()));
    }

    async fn send_error(&mut self, text: &str) {
        self.emit(ServerEvent::Error(text.to_string()));
    }

    async fn get_input(&mut self, prompt: &str) -> Result<String, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.discard_unsolicited();
        self.outbound
            .send(ServerEvent::RequestInput(prompt.to_string()))
            .map_err(|_| TransportError::Closed)?;

        match self.inbound.recv().await {
            Some(ClientEvent::InputResponse(reply)) => Ok(reply),
            None => Err(TransportError::Closed),
        }
    }

    async fn close(&mut self) {
        self.emit(ServerEvent::Disconnect);
        self.closed = true;
        self.inbound.close();
    }
}

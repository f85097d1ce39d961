//! The I/O channel between a running conversation and its user.

use crate::error::TransportError;
use async_trait::async_trait;

pub mod console;
pub mod duplex;
pub mod socket;

pub use console::ConsoleTransport;
pub use duplex::{DuplexTransport, Frame};
pub use socket::{ClientEvent, ServerEvent, SocketPeer, SocketTransport};

/// The capability the interpreter calls into for every user-visible effect.
///
/// Implement this to plug the interpreter into a new kind of channel.
#[async_trait]
pub trait Transport: Send {
    /// Emits a message. No acknowledgement; delivery failures are the
    /// transport's concern and are only logged.
    async fn send_message(&mut self, text: &str);

    /// Emits an error on a distinct channel where the transport has one.
    async fn send_error(&mut self, text: &str);

    /// Requests one reply from the user. The returned future resolves exactly
    /// once; `prompt` is display text only.
    async fn get_input(&mut self, prompt: &str) -> Result<String, TransportError>;

    /// Releases the channel. Later sends are dropped and later input requests
    /// fail with [`TransportError::Closed`].
    async fn close(&mut self);
}

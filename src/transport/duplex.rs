use super::Transport;
use crate::error::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const INVALID_FRAME: &str = "Invalid message format";

/// One newline-delimited JSON frame, e.g. `{"type":"input","content":"42"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "camelCase")]
pub enum Frame {
    Message(String),
    Error(String),
    Prompt(String),
    Input(String),
    /// Sent by the client to open a session on the named project.
    Start(String),
}

/// What the reader task hands over for each inbound line.
#[derive(Debug)]
enum Inbound {
    Frame(Frame),
    Malformed(String),
    Failed(TransportError),
}

/// Transport over a raw byte stream carrying [`Frame`]s.
///
/// Inbound lines are parsed by a background task as they arrive. Frames that
/// arrive while no input request is outstanding are discarded, so each prompt
/// is answered by an `input` frame sent after it. Malformed frames are
/// answered with an error frame and skipped.
pub struct DuplexTransport<W> {
    inbound: mpsc::UnboundedReceiver<Inbound>,
    reader: JoinHandle<()>,
    writer: W,
    closed: bool,
}

impl<W> DuplexTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Starts reading `reader` on the current tokio runtime.
    pub fn new<R>(reader: R, writer: W) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (frames, inbound) = mpsc::unbounded_channel();
        Self {
            inbound,
            reader: tokio::spawn(read_frames(reader, frames)),
            writer,
            closed: false,
        }
    }

    /// Stops the reader task and hands back the writer.
    pub fn into_writer(self) -> W {
        self.reader.abort();
        self.writer
    }

    /// Waits for the client's `start` frame and returns the project it names.
    pub async fn await_start(&mut self) -> Result<String, TransportError> {
        loop {
            if let Frame::Start(project) = self.next_frame().await? {
                return Ok(project);
            }
        }
    }

    async fn write_frame(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let mut line = serde_json::to_vec(frame).map_err(|e| TransportError::Io(e.to_string()))?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn emit(&mut self, frame: Frame) {
        if self.closed {
            return;
        }
        if let Err(e) = self.write_frame(&frame).await {
            warn!("duplex: failed to write frame: {}", e);
        }
    }

    async fn reject(&mut self, reason: &str) -> Result<(), TransportError> {
        debug!("duplex: malformed frame: {}", reason);
        self.write_frame(&Frame::Error(INVALID_FRAME.to_string()))
            .await
    }

    /// Waits for the next well-formed frame, answering malformed ones in place.
    async fn next_frame(&mut self) -> Result<Frame, TransportError> {
        loop {
            match self.inbound.recv().await {
                Some(Inbound::Frame(frame)) => return Ok(frame),
                Some(Inbound::Malformed(reason)) => self.reject(&reason).await?,
                Some(Inbound::Failed(error)) => return Err(error),
                None => return Err(TransportError::Closed),
            }
        }
    }

    async fn discard_unsolicited(&mut self) -> Result<(), TransportError> {
        while let Ok(inbound) = self.inbound.try_recv() {
            match inbound {
                Inbound::Frame(frame) => {
                    debug!(?frame, "duplex: discarding frame with no pending request")
                }
                Inbound::Malformed(reason) => self.reject(&reason).await?,
                Inbound::Failed(error) => return Err(error),
            }
        }
        Ok(())
    }
}

async fn read_frames<R>(mut reader: R, frames: mpsc::UnboundedSender<Inbound>)
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        let inbound = match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<Frame>(trimmed) {
                    Ok(frame) => Inbound::Frame(frame),
                    Err(e) => Inbound::Malformed(e.to_string()),
                }
            }
            Err(e) => Inbound::Failed(e.into()),
        };
        let failed = matches!(inbound, Inbound::Failed(_));
        if frames.send(inbound).is_err() || failed {
            break;
        }
    }
}

#[async_trait]
impl<W> Transport for DuplexTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_message(&mut self, text: &str) {
        self.emit(Frame::Message(text.to_string())).await;
    }

    async fn send_error(&mut self, text: &str) {
        self.emit(Frame::Error(text.to_string())).await;
    }

    async fn get_input(&mut self, prompt: &str) -> Result<String, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.discard_unsolicited().await?;
        self.write_frame(&Frame::Prompt(prompt.to_string())).await?;
        loop {
            match self.next_frame().await? {
                Frame::Input(reply) => return Ok(reply),
                other => debug!(?other, "duplex: ignoring non-input frame while waiting"),
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.reader.abort();
        self.inbound.close();
        if let Err(e) = self.writer.shutdown().await {
            debug!("duplex: shutdown failed: {}", e);
        }
    }
}

use super::Transport;
use crate::error::TransportError;
use async_trait::async_trait;
use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stderr, Stdin,
    Stdout,
};
use tracing::warn;

/// Plain-text, line-oriented transport.
///
/// Messages are written one per line, prompts without a trailing newline, and
/// each reply is one line of input. Errors go to a separate writer.
pub struct ConsoleTransport<R, W, E> {
    input: R,
    output: W,
    errors: E,
    closed: bool,
}

impl ConsoleTransport<BufReader<Stdin>, Stdout, Stderr> {
    /// A console transport on the process's standard streams.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout(), io::stderr())
    }
}

impl<R, W, E> ConsoleTransport<R, W, E>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    E: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W, errors: E) -> Self {
        Self {
            input,
            output,
            errors,
            closed: false,
        }
    }

    pub fn into_inner(self) -> (R, W, E) {
        (self.input, self.output, self.errors)
    }

    async fn write_line(writer: &mut (impl AsyncWrite + Unpin), text: &str) -> std::io::Result<()> {
        writer.write_all(text.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }
}

#[async_trait]
impl<R, W, E> Transport for ConsoleTransport<R, W, E>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    E: AsyncWrite + Unpin + Send,
{
    async fn send_message(&mut self, text: &str) {
        if self.closed {
            return;
        }
        if let Err(e) = Self::write_line(&mut self.output, text).await {
            warn!("console: failed to write message: {}", e);
        }
    }

    async fn send_error(&mut self, text: &str) {
        if self.closed {
            return;
        }
        if let Err(e) = Self::write_line(&mut self.errors, text).await {
            warn!("console: failed to write error: {}", e);
        }
    }

    async fn get_input(&mut self, prompt: &str) -> Result<String, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(TransportError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.output.flush().await {
            warn!("console: failed to flush output: {}", e);
        }
    }
}

use crate::value::NodeId;
use thiserror::Error;

/// Errors that can occur when converting an editor graph into a `FlowDefinition`.
#[derive(Error, Debug, Clone)]
pub enum ConversionError {
    #[error("Failed to parse graph JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid graph data: {0}")]
    ValidationError(String),
}

/// Errors that terminate a run. Every variant is reported through the transport
/// before the run ends; none of them escape to the host as a fault.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunError {
    #[error("Start block not found or more than one start block ({count} found)")]
    StartBlock { count: usize },

    #[error("Block not found: {0}")]
    BlockNotFound(NodeId),

    #[error("No default link from conditional block {block}")]
    NoDefaultLink { block: NodeId },

    #[error("Invalid choice")]
    InvalidChoice { block: NodeId, reply: String },

    #[error("No options to choose from in block {block}")]
    NoChoices { block: NodeId },

    #[error("Block {block} is missing its {field}")]
    MissingField { block: NodeId, field: &'static str },

    #[error("External call to '{url}' failed: {message}")]
    ExternalCall { url: String, message: String },

    #[error("Unknown block type '{type_name}' in block {block}")]
    UnknownBlockType { block: NodeId, type_name: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl RunError {
    /// Errors raised by the outside world go to the error channel; everything
    /// caused by the graph or the user's reply is an ordinary message.
    pub fn is_external(&self) -> bool {
        matches!(self, RunError::ExternalCall { .. } | RunError::Transport(_))
    }
}

/// Errors raised by a transport while exchanging messages with the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Channel closed")]
    Closed,

    #[error("I/O failure: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e.to_string())
    }
}

/// Errors that can occur while performing an external call.
#[derive(Error, Debug)]
pub enum FetchError {
    #[cfg(feature = "http-fetch")]
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Response was not valid JSON: {0}")]
    Decode(String),

    #[error("No fetcher configured for external calls")]
    Unavailable,
}

/// Errors that can occur while resolving a named graph.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Project '{0}' not found")]
    NotFound(String),

    #[error("Invalid project name '{0}'")]
    InvalidName(String),

    #[error("Could not read project '{project}': {message}")]
    Io { project: String, message: String },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Errors that can occur while writing or reading a binary graph snapshot.
#[derive(Error, Debug, Clone)]
pub enum SnapshotError {
    #[error("Snapshot error: {0}")]
    Generic(String),
}

//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the chatflow
//! crate. Import it to get access to the core functionality without having to import
//! each type individually.

// Graph model and loading
pub use crate::flow::{
    ChoiceDefinition, ConditionDefinition, EditorGraph, FlowDefinition, FlowLinkDefinition,
    FlowNodeDefinition, IntoFlow,
};
pub use crate::graph::{Block, BlockKind, Flow};
pub use crate::source::{DirectorySource, GraphSource, MemorySource};

// Running conversations
pub use crate::config::Prompts;
pub use crate::fetch::Fetcher;
#[cfg(feature = "http-fetch")]
pub use crate::fetch::HttpFetcher;
pub use crate::interpreter::{Completion, Interpreter, RunOutcome, State, Termination};
pub use crate::transport::{ConsoleTransport, DuplexTransport, SocketTransport, Transport};

// Values and errors
pub use crate::error::{
    ConversionError, FetchError, RunError, SnapshotError, SourceError, TransportError,
};
pub use crate::value::{NodeId, Value};
pub use crate::variables::Variables;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

//! # Chatflow - Conversation Graph Interpreter
//!
//! **Chatflow** runs conversations designed as graphs in a visual editor. A graph is a
//! set of typed blocks (messages, variable captures, conditions, menus, external
//! calls) connected by links; the interpreter walks it block by block and talks to
//! the user through a pluggable transport.
//!
//! ## Core Workflow
//!
//! The interpreter is format-agnostic. It operates on a canonical internal model of a
//! "flow definition." The primary workflow is:
//!
//! 1.  **Load Your Graph**: Parse the editor export with [`EditorGraph`](flow::EditorGraph),
//!     resolve it by project name through a [`GraphSource`](source::GraphSource), or
//!     implement [`IntoFlow`](flow::IntoFlow) for your own format.
//! 2.  **Build**: Turn the `FlowDefinition` into a [`Flow`](graph::Flow), the read-only
//!     block registry every run of that graph shares.
//! 3.  **Pick a Transport**: console, socket-style event channel, or newline-delimited
//!     JSON frames over any async byte stream.
//! 4.  **Run**: Create an [`Interpreter`](interpreter::Interpreter) per session and
//!     drive it to completion.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatflow::prelude::*;
//!
//! # async fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("demos/greeting.json")?;
//! let definition = EditorGraph::from_json(&json)?.into_flow()?;
//! let flow = Flow::new(definition);
//!
//! let mut interpreter = Interpreter::new(flow, ConsoleTransport::stdio());
//! let outcome = interpreter.run().await;
//!
//! if let Some(error) = outcome.termination.error() {
//!     eprintln!("-> Conversation ended with an error: {}", error);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod flow;
pub mod graph;
pub mod interpreter;
pub mod prelude;
pub mod source;
pub mod transport;
pub mod value;
pub mod variables;

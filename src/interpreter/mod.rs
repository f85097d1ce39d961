//! The interpreter: walks a [`Flow`] block by block, talking to the user
//! through a [`Transport`].
//!
//! A run starts at the unique start block and moves along links until it
//! reaches a block with no outgoing links, an end block, or an error. Input is
//! requested only by save blocks, choice blocks and blocks with several
//! outgoing links; each request suspends the run until the transport delivers
//! exactly one reply. Every error is reported through the transport, which is
//! then closed, so a run always ends in an observable state.

use crate::config::Prompts;
use crate::error::{FetchError, RunError};
#[cfg(feature = "http-fetch")]
use crate::fetch::HttpFetcher;
use crate::fetch::{Fetcher, summarize};
use crate::graph::{Block, BlockKind, Choice, Condition, Flow, Link};
use crate::transport::Transport;
use crate::value::{NodeId, Value};
use crate::variables::Variables;
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

mod condition;
mod interpolate;
mod state;

pub use condition::{Operator, evaluate};
pub use interpolate::interpolate;
pub use state::{Completion, PendingInput, RunOutcome, State, Termination};

/// Output port a conditional block falls back to when no condition selects a link.
pub const DEFAULT_PORT: &str = "OUT0";

enum Transition {
    Goto(NodeId),
    Complete(Completion),
}

pub struct Interpreter<T> {
    flow: Arc<Flow>,
    transport: T,
    fetcher: Option<Arc<dyn Fetcher>>,
    prompts: Prompts,
    default_port: String,
    variables: Variables,
    state: State,
    visited: Vec<NodeId>,
    closed: bool,
}

pub struct InterpreterBuilder<T> {
    flow: Arc<Flow>,
    transport: T,
    fetcher: Option<Arc<dyn Fetcher>>,
    prompts: Prompts,
    default_port: String,
}

impl<T: Transport> InterpreterBuilder<T> {
    pub fn new(flow: impl Into<Arc<Flow>>, transport: T) -> Self {
        #[cfg(feature = "http-fetch")]
        let fetcher: Option<Arc<dyn Fetcher>> = Some(Arc::new(HttpFetcher::new()));
        #[cfg(not(feature = "http-fetch"))]
        let fetcher: Option<Arc<dyn Fetcher>> = None;

        Self {
            flow: flow.into(),
            transport,
            fetcher,
            prompts: Prompts::default(),
            default_port: DEFAULT_PORT.to_string(),
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Shares one fetcher between several interpreters.
    pub fn with_shared_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// External-call blocks will fail instead of making requests.
    pub fn without_fetcher(mut self) -> Self {
        self.fetcher = None;
        self
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_default_port(mut self, port: impl Into<String>) -> Self {
        self.default_port = port.into();
        self
    }

    pub fn build(self) -> Interpreter<T> {
        let starts: Vec<&Block> = self.flow.start_blocks().collect();
        let state = match starts.as_slice() {
            [start] => State::Running(start.id.clone()),
            _ => State::Terminated(Termination::Failed(RunError::StartBlock {
                count: starts.len(),
            })),
        };

        Interpreter {
            flow: self.flow,
            transport: self.transport,
            fetcher: self.fetcher,
            prompts: self.prompts,
            default_port: self.default_port,
            variables: Variables::new(),
            state,
            visited: Vec::new(),
            closed: false,
        }
    }
}

impl<T: Transport> Interpreter<T> {
    pub fn builder(flow: impl Into<Arc<Flow>>, transport: T) -> InterpreterBuilder<T> {
        InterpreterBuilder::new(flow, transport)
    }

    pub fn new(flow: impl Into<Arc<Flow>>, transport: T) -> Self {
        InterpreterBuilder::new(flow, transport).build()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn visited(&self) -> &[NodeId] {
        &self.visited
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Drives the run to a terminal state, reports it and closes the transport.
    ///
    /// Calling this again after termination reports nothing and returns the
    /// same outcome.
    pub async fn run(&mut self) -> RunOutcome {
        let termination = loop {
            match &self.state {
                State::Terminated(termination) => break termination.clone(),
                // A run whose previous driver was dropped mid-request re-enters the block.
                State::Running(id) | State::AwaitingInput { at: id, .. } => {
                    let id = id.clone();
                    self.state = match self.step(&id).await {
                        Ok(Transition::Goto(next)) => State::Running(next),
                        Ok(Transition::Complete(completion)) => {
                            State::Terminated(Termination::Completed(completion))
                        }
                        Err(error) => State::Terminated(Termination::Failed(error)),
                    };
                }
            }
        };

        self.finish(&termination).await;
        RunOutcome {
            visited: self.visited.clone(),
            termination,
            variables: self.variables.clone(),
        }
    }

    async fn finish(&mut self, termination: &Termination) {
        if self.closed {
            return;
        }

        match termination {
            Termination::Completed(completion) => {
                info!(?completion, visited = self.visited.len(), "run completed");
                let text = match completion {
                    Completion::NoFurtherLinks => &self.prompts.no_further_links,
                    Completion::EndBlock => &self.prompts.chat_finished,
                };
                self.transport.send_message(text).await;
            }
            Termination::Failed(error) => {
                warn!(visited = self.visited.len(), "run failed: {}", error);
                let text = error.to_string();
                if error.is_external() {
                    self.transport.send_error(&text).await;
                } else {
                    self.transport.send_message(&text).await;
                }
            }
        }

        self.transport.close().await;
        self.closed = true;
    }

    async fn step(&mut self, id: &NodeId) -> Result<Transition, RunError> {
        let flow = Arc::clone(&self.flow);
        let block = flow
            .block(id)
            .ok_or_else(|| RunError::BlockNotFound(id.clone()))?;
        self.visited.push(id.clone());
        debug!(block = %id, kind = block.kind.tag(), "visiting block");

        match &block.kind {
            BlockKind::Start => self.advance(&flow, block).await,
            BlockKind::Message => {
                let text = interpolate(block.text.as_deref().unwrap_or_default(), &self.variables);
                self.transport.send_message(&text).await;
                self.advance(&flow, block).await
            }
            BlockKind::Save { variable } => {
                let variable = variable
                    .as_deref()
                    .ok_or_else(|| missing_field(block, "variable name"))?;
                let prompt = self.prompts.capture_prompt(variable);
                let pending = PendingInput::Capture {
                    variable: variable.to_string(),
                };
                let reply = self.request_input(id, pending, &prompt).await?;
                self.variables.set(variable, Value::Text(reply));
                self.advance(&flow, block).await
            }
            BlockKind::Conditional { conditions } => self.branch(&flow, block, conditions),
            BlockKind::Choice { choices } => self.choose(&flow, block, choices).await,
            BlockKind::ExternalCall { url, variable } => {
                let url = url.as_deref().ok_or_else(|| missing_field(block, "url"))?;
                let variable = variable
                    .as_deref()
                    .ok_or_else(|| missing_field(block, "variable name"))?;
                let summary = self.call_external(url).await?;
                self.variables.set(variable, Value::Text(summary));
                self.advance(&flow, block).await
            }
            BlockKind::End => Ok(Transition::Complete(Completion::EndBlock)),
            BlockKind::Unknown { type_name } => Err(RunError::UnknownBlockType {
                block: id.clone(),
                type_name: type_name.clone(),
            }),
        }
    }

    /// Follows the block's outgoing links: none ends the run, one is taken
    /// directly, several are offered to the user as a numbered menu.
    async fn advance(&mut self, flow: &Flow, block: &Block) -> Result<Transition, RunError> {
        let links: Vec<&Link> = flow.links_from(&block.id).collect();
        match links.as_slice() {
            [] => Ok(Transition::Complete(Completion::NoFurtherLinks)),
            [only] => Ok(Transition::Goto(only.to.clone())),
            _ => {
                let labels = links.iter().map(|link| {
                    flow.block(&link.to)
                        .and_then(|target| target.text.as_deref())
                        .unwrap_or(&self.prompts.fallback_label)
                });
                let prompt = format!("{}\n{}", self.prompts.choose_action, numbered(labels));
                let pending = PendingInput::Advance {
                    targets: links.len(),
                };
                let reply = self.request_input(&block.id, pending, &prompt).await?;
                match menu_index(&reply, links.len()) {
                    Some(index) => Ok(Transition::Goto(links[index].to.clone())),
                    None => Err(RunError::InvalidChoice {
                        block: block.id.clone(),
                        reply,
                    }),
                }
            }
        }
    }

    fn branch(
        &self,
        flow: &Flow,
        block: &Block,
        conditions: &[Condition],
    ) -> Result<Transition, RunError> {
        for condition in conditions {
            let stored = self.variables.get(&condition.variable);
            let met = evaluate(stored, &condition.operator, &condition.comparand);
            trace!(
                block = %block.id,
                variable = %condition.variable,
                stored = stored.map_or("unset", crate::value::Value::kind),
                operator = %condition.operator,
                comparand = %condition.comparand,
                met,
                "condition evaluated"
            );
            if !met {
                continue;
            }
            match link_on_port(flow, &block.id, &condition.port) {
                Some(link) => return Ok(Transition::Goto(link.to.clone())),
                None => debug!(block = %block.id, port = %condition.port, "no link on port"),
            }
        }

        link_on_port(flow, &block.id, &self.default_port)
            .map(|link| Transition::Goto(link.to.clone()))
            .ok_or_else(|| RunError::NoDefaultLink {
                block: block.id.clone(),
            })
    }

    async fn choose(
        &mut self,
        flow: &Flow,
        block: &Block,
        choices: &[Choice],
    ) -> Result<Transition, RunError> {
        if choices.is_empty() {
            return Err(RunError::NoChoices {
                block: block.id.clone(),
            });
        }

        let labels = choices.iter().map(|choice| choice.label.as_str());
        let prompt = format!("{}\n{}", self.prompts.choose_option, numbered(labels));
        let pending = PendingInput::Choice {
            options: choices.len(),
        };
        let reply = self.request_input(&block.id, pending, &prompt).await?;

        let target = menu_index(&reply, choices.len())
            .and_then(|index| link_on_port(flow, &block.id, &choices[index].port));
        match target {
            Some(link) => Ok(Transition::Goto(link.to.clone())),
            None => Err(RunError::InvalidChoice {
                block: block.id.clone(),
                reply,
            }),
        }
    }

    async fn call_external(&mut self, url: &str) -> Result<String, RunError> {
        let failed = |error: FetchError| RunError::ExternalCall {
            url: url.to_string(),
            message: error.to_string(),
        };
        let fetcher = self
            .fetcher
            .clone()
            .ok_or_else(|| failed(FetchError::Unavailable))?;
        debug!(url, "calling external resource");
        let response = fetcher.fetch(url).await.map_err(failed)?;
        Ok(summarize(&response))
    }

    async fn request_input(
        &mut self,
        at: &NodeId,
        pending: PendingInput,
        prompt: &str,
    ) -> Result<String, RunError> {
        debug!(block = %at, ?pending, "awaiting input");
        self.state = State::AwaitingInput {
            at: at.clone(),
            pending,
        };
        let reply = self.transport.get_input(prompt).await?;
        self.state = State::Running(at.clone());
        Ok(reply)
    }
}

fn missing_field(block: &Block, field: &'static str) -> RunError {
    RunError::MissingField {
        block: block.id.clone(),
        field,
    }
}

fn link_on_port<'a>(flow: &'a Flow, from: &NodeId, port: &str) -> Option<&'a Link> {
    flow.links_from(from)
        .find(|link| link.from_port.as_deref() == Some(port))
}

fn numbered<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels
        .enumerate()
        .map(|(index, label)| format!("{}. {}", index + 1, label))
        .join("\n")
}

/// Parses a 1-based menu reply into a 0-based index below `len`.
///
/// Only plain decimal digits are accepted, surrounding whitespace aside.
pub fn menu_index(reply: &str, len: usize) -> Option<usize> {
    let reply = reply.trim();
    if reply.is_empty() || !reply.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    reply
        .parse::<usize>()
        .ok()
        .filter(|choice| (1..=len).contains(choice))
        .map(|choice| choice - 1)
}

//! Common test utilities for building graphs and driving the interpreter.
use async_trait::async_trait;
use chatflow::prelude::*;
use chatflow::transport::Frame;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};

/// Everything a transport was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum Event {
    Message(String),
    Error(String),
    Prompt(String),
    Closed,
}

/// A transport that answers input requests from a fixed script and records every call.
///
/// When the script runs out, input requests fail as if the user had disconnected.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: VecDeque<String>,
    pub events: Vec<Event>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            events: Vec::new(),
        }
    }

    pub fn messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Message(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Error(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn prompts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Prompt(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn remaining_replies(&self) -> usize {
        self.replies.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_message(&mut self, text: &str) {
        self.events.push(Event::Message(text.to_string()));
    }

    async fn send_error(&mut self, text: &str) {
        self.events.push(Event::Error(text.to_string()));
    }

    async fn get_input(&mut self, prompt: &str) -> std::result::Result<String, TransportError> {
        self.events.push(Event::Prompt(prompt.to_string()));
        self.replies.pop_front().ok_or(TransportError::Closed)
    }

    async fn close(&mut self) {
        self.events.push(Event::Closed);
    }
}

/// A fetcher that serves one canned response and remembers the URLs it was asked for.
#[allow(dead_code)]
pub struct StaticFetcher {
    response: std::result::Result<serde_json::Value, String>,
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StaticFetcher {
    pub fn ok(response: serde_json::Value) -> Self {
        Self {
            response: Ok(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<serde_json::Value, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        self.response
            .clone()
            .map_err(FetchError::Decode)
    }
}

#[allow(dead_code)]
pub fn node(id: &str, block_type: &str) -> FlowNodeDefinition {
    FlowNodeDefinition::new(id, block_type)
}

#[allow(dead_code)]
pub fn message(id: &str, text: &str) -> FlowNodeDefinition {
    let mut node = node(id, "messageBlock");
    node.text = Some(text.to_string());
    node
}

#[allow(dead_code)]
pub fn save(id: &str, variable: &str) -> FlowNodeDefinition {
    let mut node = node(id, "saveBlock");
    node.variable_name = Some(variable.to_string());
    node
}

#[allow(dead_code)]
pub fn conditional(id: &str, conditions: &[(&str, &str, Value, &str)]) -> FlowNodeDefinition {
    let mut node = node(id, "conditionalBlock");
    node.conditions = Some(
        conditions
            .iter()
            .map(|(variable, operator, comparand, port)| ConditionDefinition {
                variable_name: variable.to_string(),
                operator: operator.to_string(),
                comparand: comparand.clone(),
                output_port: port.to_string(),
            })
            .collect(),
    );
    node
}

#[allow(dead_code)]
pub fn choice(id: &str, options: &[(&str, &str)]) -> FlowNodeDefinition {
    let mut node = node(id, "optionsBlock");
    node.choices = Some(
        options
            .iter()
            .map(|(label, port)| ChoiceDefinition {
                label: label.to_string(),
                output_port: port.to_string(),
            })
            .collect(),
    );
    node
}

#[allow(dead_code)]
pub fn api(id: &str, url: &str, variable: &str) -> FlowNodeDefinition {
    let mut node = node(id, "apiBlock");
    node.url = Some(url.to_string());
    node.variable_name = Some(variable.to_string());
    node
}

#[allow(dead_code)]
pub fn link(from: &str, to: &str) -> FlowLinkDefinition {
    FlowLinkDefinition::new(from, to)
}

#[allow(dead_code)]
pub fn port_link(from: &str, to: &str, port: &str) -> FlowLinkDefinition {
    FlowLinkDefinition::new(from, to).with_port(port)
}

/// `start -> save(name) -> message("Hi {name}") -> end`
#[allow(dead_code)]
pub fn greeting_definition() -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            node("start", "startBlock"),
            save("ask", "name"),
            message("greet", "Hi {name}"),
            node("end", "endBlock"),
        ],
        links: vec![
            link("start", "ask"),
            link("ask", "greet"),
            link("greet", "end"),
        ],
    }
}

/// `age >= 18` goes to `adult` on OUT1, otherwise `minor` on the default port.
///
/// With `capture_age` the run first asks for `age`; without it `age` stays unset.
#[allow(dead_code)]
pub fn age_check_definition(capture_age: bool, with_default: bool) -> FlowDefinition {
    let mut nodes = vec![
        node("start", "startBlock"),
        conditional("check", &[("age", ">=", Value::Number(18.0), "OUT1")]),
        message("adult", "Welcome"),
        message("minor", "Too young"),
    ];
    let mut links = vec![port_link("check", "adult", "OUT1")];
    if with_default {
        links.push(port_link("check", "minor", "OUT0"));
    }
    if capture_age {
        nodes.push(save("ask", "age"));
        links.push(link("start", "ask"));
        links.push(link("ask", "check"));
    } else {
        links.push(link("start", "check"));
    }
    FlowDefinition { nodes, links }
}

/// A choice between two options on ports P1 and P2.
#[allow(dead_code)]
pub fn choice_definition() -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            node("start", "startBlock"),
            choice("pick", &[("Apples", "P1"), ("Pears", "P2")]),
            message("apples", "You picked apples"),
            message("pears", "You picked pears"),
        ],
        links: vec![
            link("start", "pick"),
            port_link("pick", "apples", "P1"),
            port_link("pick", "pears", "P2"),
        ],
    }
}

/// Builds a flow and runs it to completion against a scripted transport.
#[allow(dead_code)]
pub async fn run_scripted(
    definition: FlowDefinition,
    replies: &[&str],
) -> (RunOutcome, ScriptedTransport) {
    let mut interpreter = Interpreter::builder(Flow::new(definition), ScriptedTransport::new(replies))
        .without_fetcher()
        .build();
    let outcome = interpreter.run().await;
    (outcome, interpreter.into_transport())
}

#[allow(dead_code)]
pub fn ids(visited: &[NodeId]) -> Vec<&str> {
    visited.iter().map(NodeId::as_str).collect()
}

#[allow(dead_code)]
pub const GREETING_JSON: &str = include_str!("../demos/greeting.json");

/// Scratch directory for tests that touch the filesystem.
#[allow(dead_code)]
pub fn setup_test_dir() -> std::path::PathBuf {
    std::env::temp_dir()
        .join("chatflow-tests")
        .join(std::process::id().to_string())
}

#[allow(dead_code)]
pub type ServerTransport = DuplexTransport<WriteHalf<DuplexStream>>;

/// The far end of an in-memory duplex session, speaking raw frame lines.
#[allow(dead_code)]
pub struct FrameClient {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

#[allow(dead_code)]
impl FrameClient {
    pub async fn send(&mut self, frame: &Frame) {
        let line = serde_json::to_string(frame).expect("frame should serialize");
        self.send_raw(&format!("{}\n", line)).await;
    }

    /// Writes `text` as-is, in a single write.
    pub async fn send_raw(&mut self, text: &str) {
        self.writer
            .write_all(text.as_bytes())
            .await
            .expect("server side dropped");
    }

    /// The next frame the server wrote, or `None` once it shut down.
    pub async fn next(&mut self) -> Option<Frame> {
        let line = self.lines.next_line().await.expect("read failed")?;
        Some(serde_json::from_str(&line).expect("server wrote a malformed frame"))
    }
}

/// A duplex transport wired to a [`FrameClient`] through an in-memory pipe.
#[allow(dead_code)]
pub fn duplex_session() -> (ServerTransport, FrameClient) {
    let (server, client) = tokio::io::duplex(4096);
    let (server_read, server_write) = tokio::io::split(server);
    let (client_read, client_write) = tokio::io::split(client);
    (
        DuplexTransport::new(BufReader::new(server_read), server_write),
        FrameClient {
            lines: BufReader::new(client_read).lines(),
            writer: client_write,
        },
    )
}

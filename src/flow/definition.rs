use crate::value::{NodeId, Value};
use serde::{Deserialize, Serialize};

/// The complete, canonical definition of a conversation graph, ready to be built
/// into a runnable [`Flow`](crate::graph::Flow).
/// This is the target structure for any custom data model conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub nodes: Vec<FlowNodeDefinition>,
    pub links: Vec<FlowLinkDefinition>,
}

/// Defines a single block in the conversation graph.
///
/// Which optional fields matter depends on `block_type`: messages use `text`,
/// save blocks use `variable_name`, external calls use both `url` and
/// `variable_name`, and so on. Unused fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNodeDefinition {
    pub id: NodeId,
    pub block_type: String,
    pub text: Option<String>,
    pub variable_name: Option<String>,
    pub conditions: Option<Vec<ConditionDefinition>>,
    pub choices: Option<Vec<ChoiceDefinition>>,
    pub url: Option<String>,
}

impl FlowNodeDefinition {
    /// A node of the given type with every optional field unset.
    pub fn new(id: impl Into<NodeId>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            text: None,
            variable_name: None,
            conditions: None,
            choices: None,
            url: None,
        }
    }
}

/// One `(variable, operator, comparand, port)` tuple of a conditional block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDefinition {
    pub variable_name: String,
    pub operator: String,
    pub comparand: Value,
    pub output_port: String,
}

/// One option of a choice block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDefinition {
    pub label: String,
    pub output_port: String,
}

/// Defines a directed link between two blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLinkDefinition {
    pub from: NodeId,
    pub to: NodeId,
    pub from_port: Option<String>,
    pub to_port: Option<String>,
}

impl FlowLinkDefinition {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            from_port: None,
            to_port: None,
        }
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.from_port = Some(port.into());
        self
    }
}

use crate::flow::{ChoiceDefinition, ConditionDefinition, FlowNodeDefinition};
use crate::interpreter::Operator;
use crate::value::{NodeId, Value};

/// A block of the conversation graph with its type-specific data resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: NodeId,
    /// Text template for message blocks; for every type it doubles as the label
    /// shown when the block is offered as a menu target.
    pub text: Option<String>,
    pub kind: BlockKind,
}

/// The closed set of block behaviours the interpreter knows how to run.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Start,
    Message,
    Save { variable: Option<String> },
    Conditional { conditions: Vec<Condition> },
    Choice { choices: Vec<Choice> },
    ExternalCall { url: Option<String>, variable: Option<String> },
    End,
    /// A type tag nothing is registered for. Reported when reached, not at load.
    Unknown { type_name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub variable: String,
    pub operator: Operator,
    pub comparand: Value,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub label: String,
    pub port: String,
}

/// Canonical type tags of the editor format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Start,
    Message,
    Save,
    Conditional,
    Options,
    Api,
    End,
}

impl BlockType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "startBlock" => Some(BlockType::Start),
            "messageBlock" => Some(BlockType::Message),
            "saveBlock" => Some(BlockType::Save),
            "conditionalBlock" => Some(BlockType::Conditional),
            "optionsBlock" => Some(BlockType::Options),
            "apiBlock" => Some(BlockType::Api),
            "endBlock" => Some(BlockType::End),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            BlockType::Start => "startBlock",
            BlockType::Message => "messageBlock",
            BlockType::Save => "saveBlock",
            BlockType::Conditional => "conditionalBlock",
            BlockType::Options => "optionsBlock",
            BlockType::Api => "apiBlock",
            BlockType::End => "endBlock",
        }
    }
}

impl BlockKind {
    /// The editor tag this kind is loaded from, or the unrecognized tag itself.
    pub fn tag(&self) -> &str {
        match self {
            BlockKind::Start => BlockType::Start.tag(),
            BlockKind::Message => BlockType::Message.tag(),
            BlockKind::Save { .. } => BlockType::Save.tag(),
            BlockKind::Conditional { .. } => BlockType::Conditional.tag(),
            BlockKind::Choice { .. } => BlockType::Options.tag(),
            BlockKind::ExternalCall { .. } => BlockType::Api.tag(),
            BlockKind::End => BlockType::End.tag(),
            BlockKind::Unknown { type_name } => type_name,
        }
    }
}

impl Block {
    /// Resolves a node definition into a typed block. `block_type` is the
    /// already-mapped canonical type, or `None` when the tag is unrecognized.
    pub(super) fn from_definition(node: FlowNodeDefinition, block_type: Option<BlockType>) -> Self {
        let kind = match block_type {
            Some(BlockType::Start) => BlockKind::Start,
            Some(BlockType::Message) => BlockKind::Message,
            Some(BlockType::Save) => BlockKind::Save {
                variable: node.variable_name,
            },
            Some(BlockType::Conditional) => BlockKind::Conditional {
                conditions: node
                    .conditions
                    .unwrap_or_default()
                    .into_iter()
                    .map(Condition::from)
                    .collect(),
            },
            Some(BlockType::Options) => BlockKind::Choice {
                choices: node
                    .choices
                    .unwrap_or_default()
                    .into_iter()
                    .map(Choice::from)
                    .collect(),
            },
            Some(BlockType::Api) => BlockKind::ExternalCall {
                url: node.url,
                variable: node.variable_name,
            },
            Some(BlockType::End) => BlockKind::End,
            None => BlockKind::Unknown {
                type_name: node.block_type,
            },
        };

        Block {
            id: node.id,
            text: node.text,
            kind,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self.kind, BlockKind::Start)
    }
}

impl From<ConditionDefinition> for Condition {
    fn from(def: ConditionDefinition) -> Self {
        Condition {
            variable: def.variable_name,
            operator: Operator::parse(&def.operator),
            comparand: def.comparand,
            port: def.output_port,
        }
    }
}

impl From<ChoiceDefinition> for Choice {
    fn from(def: ChoiceDefinition) -> Self {
        Choice {
            label: def.label,
            port: def.output_port,
        }
    }
}

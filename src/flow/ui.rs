//! Deserialization structs for the diagram editor's JSON export.
//!
//! These mirror the editor format field-for-field and are only used to feed
//! the [`IntoFlow`] conversion.

use super::conversion::IntoFlow;
use super::definition::{
    ChoiceDefinition, ConditionDefinition, FlowDefinition, FlowLinkDefinition, FlowNodeDefinition,
};
use crate::error::ConversionError;
use crate::value::{NodeId, Value};
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Complete editor graph structure
#[derive(Debug, Deserialize)]
pub struct EditorGraph {
    #[serde(alias = "nodeDataArray", alias = "nodes")]
    pub node_data_array: Vec<EditorNode>,
    #[serde(alias = "linkDataArray", alias = "links", default)]
    pub link_data_array: Vec<EditorLink>,
}

/// Editor node with all type-specific fields flattened
#[derive(Debug, Deserialize)]
pub struct EditorNode {
    #[serde(alias = "key", deserialize_with = "scalar_id")]
    pub id: String,
    #[serde(rename = "type", alias = "category")]
    pub node_type: String,
    pub text: Option<String>,
    #[serde(alias = "variableName")]
    pub variable_name: Option<String>,
    pub conditions: Option<Vec<EditorCondition>>,
    #[serde(alias = "choises")]
    pub choices: Option<Vec<EditorChoice>>,
    pub url: Option<String>,
}

/// Condition row of a conditional node
#[derive(Debug, Deserialize)]
pub struct EditorCondition {
    #[serde(alias = "variableName")]
    pub variable_name: String,
    pub condition: String,
    #[serde(alias = "conditionValue")]
    pub condition_value: serde_json::Value,
    #[serde(alias = "portId")]
    pub port_id: String,
}

/// Option row of an options node
#[derive(Debug, Deserialize)]
pub struct EditorChoice {
    pub text: String,
    #[serde(alias = "portId")]
    pub port_id: String,
}

/// Editor link between two nodes
#[derive(Debug, Deserialize)]
pub struct EditorLink {
    #[serde(deserialize_with = "scalar_id")]
    pub from: String,
    #[serde(deserialize_with = "scalar_id")]
    pub to: String,
    #[serde(alias = "fromPort")]
    pub from_port: Option<String>,
    #[serde(alias = "toPort")]
    pub to_port: Option<String>,
}

impl EditorGraph {
    /// Parses an editor export from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(json).map_err(|e| ConversionError::JsonParseError(e.to_string()))
    }
}

/// The editor emits numeric keys, hand-written graphs often use strings.
fn scalar_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or number id, found {}",
            other
        ))),
    }
}

fn comparand(raw: serde_json::Value, node_id: &str) -> Result<Value, ConversionError> {
    match raw {
        serde_json::Value::String(s) => Ok(Value::Text(s)),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| {
            ConversionError::ValidationError(format!(
                "condition value {} in node '{}' is not representable",
                n, node_id
            ))
        }),
        other => Err(ConversionError::ValidationError(format!(
            "condition value in node '{}' must be a string, number or boolean, found {}",
            node_id, other
        ))),
    }
}

impl IntoFlow for EditorGraph {
    fn into_flow(self) -> Result<FlowDefinition, ConversionError> {
        let nodes = self
            .node_data_array
            .into_iter()
            .map(|node| {
                let conditions = node
                    .conditions
                    .map(|rows| {
                        rows.into_iter()
                            .map(|row| {
                                Ok(ConditionDefinition {
                                    variable_name: row.variable_name,
                                    operator: row.condition,
                                    comparand: comparand(row.condition_value, &node.id)?,
                                    output_port: row.port_id,
                                })
                            })
                            .collect::<Result<Vec<_>, ConversionError>>()
                    })
                    .transpose()?;

                let choices = node.choices.map(|rows| {
                    rows.into_iter()
                        .map(|row| ChoiceDefinition {
                            label: row.text,
                            output_port: row.port_id,
                        })
                        .collect()
                });

                Ok(FlowNodeDefinition {
                    id: NodeId::new(node.id),
                    block_type: node.node_type,
                    text: node.text,
                    variable_name: node.variable_name,
                    conditions,
                    choices,
                    url: node.url,
                })
            })
            .collect::<Result<Vec<_>, ConversionError>>()?;

        let links = self
            .link_data_array
            .into_iter()
            .map(|link| FlowLinkDefinition {
                from: NodeId::new(link.from),
                to: NodeId::new(link.to),
                from_port: link.from_port,
                to_port: link.to_port,
            })
            .collect();

        Ok(FlowDefinition { nodes, links })
    }
}

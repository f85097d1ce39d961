use super::definition::FlowDefinition;
use crate::error::ConversionError;

/// A trait for custom data models that can be converted into a `FlowDefinition`.
///
/// This is the primary extension point for loading graphs from formats other
/// than the editor JSON handled by [`EditorGraph`](super::EditorGraph). By
/// implementing this trait on your own structs, you provide a translation layer
/// that lets the interpreter run your format.
///
/// # Example
///
/// ```rust,no_run
/// use chatflow::error::ConversionError;
/// use chatflow::flow::{FlowDefinition, FlowLinkDefinition, FlowNodeDefinition, IntoFlow};
/// use chatflow::value::NodeId;
///
/// struct Script { lines: Vec<String> }
///
/// impl IntoFlow for Script {
///     fn into_flow(self) -> Result<FlowDefinition, ConversionError> {
///         let mut nodes = vec![FlowNodeDefinition::new("start", "startBlock")];
///         let mut links = Vec::new();
///         let mut previous = NodeId::from("start");
///         for (index, line) in self.lines.into_iter().enumerate() {
///             let id = NodeId::new(format!("line-{index}"));
///             let mut node = FlowNodeDefinition::new(id.clone(), "messageBlock");
///             node.text = Some(line);
///             nodes.push(node);
///             links.push(FlowLinkDefinition::new(previous, id.clone()));
///             previous = id;
///         }
///         Ok(FlowDefinition { nodes, links })
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into a runnable conversation graph.
    fn into_flow(self) -> Result<FlowDefinition, ConversionError>;
}

impl IntoFlow for FlowDefinition {
    fn into_flow(self) -> Result<FlowDefinition, ConversionError> {
        Ok(self)
    }
}

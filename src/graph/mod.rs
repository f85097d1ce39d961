//! The node registry: an arena of typed blocks and their links, built once per
//! graph and read-only afterwards.

use crate::flow::{FlowDefinition, FlowLinkDefinition};
use crate::value::NodeId;
use ahash::AHashMap;
use tracing::warn;

mod block;

pub use block::{Block, BlockKind, BlockType, Choice, Condition};

/// A directed link between two blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    pub from_port: Option<String>,
    /// Destination port. Carried for completeness; execution never reads it.
    pub to_port: Option<String>,
}

impl From<FlowLinkDefinition> for Link {
    fn from(def: FlowLinkDefinition) -> Self {
        Link {
            from: def.from,
            to: def.to,
            from_port: def.from_port,
            to_port: def.to_port,
        }
    }
}

/// An immutable, runnable conversation graph.
#[derive(Debug, Clone, Default)]
pub struct Flow {
    blocks: Vec<Block>,
    index: AHashMap<NodeId, usize>,
    links: Vec<Link>,
    outgoing: AHashMap<NodeId, Vec<usize>>,
}

pub struct FlowBuilder {
    definition: FlowDefinition,
    type_map: AHashMap<String, BlockType>,
}

impl FlowBuilder {
    pub fn new(definition: FlowDefinition) -> Self {
        Self {
            definition,
            type_map: AHashMap::new(),
        }
    }

    /// Treats `user_type_name` as an alias of one of the canonical block tags.
    /// Mappings onto a tag that is not canonical are ignored.
    pub fn with_type_mapping(mut self, user_type_name: &str, canonical_type_name: &str) -> Self {
        match BlockType::from_tag(canonical_type_name) {
            Some(block_type) => {
                self.type_map.insert(user_type_name.to_string(), block_type);
            }
            None => warn!(
                user_type_name,
                canonical_type_name, "ignoring type mapping onto an unknown block type"
            ),
        }
        self
    }

    pub fn build(self) -> Flow {
        let FlowDefinition { nodes, links } = self.definition;

        let mut blocks: Vec<Block> = Vec::with_capacity(nodes.len());
        let mut index: AHashMap<NodeId, usize> = AHashMap::with_capacity(nodes.len());
        for node in nodes {
            let block_type = self
                .type_map
                .get(&node.block_type)
                .copied()
                .or_else(|| BlockType::from_tag(&node.block_type));
            let block = Block::from_definition(node, block_type);
            if let Some(&existing) = index.get(&block.id) {
                warn!(id = %block.id, "duplicate block id, the later definition wins");
                blocks[existing] = block;
            } else {
                index.insert(block.id.clone(), blocks.len());
                blocks.push(block);
            }
        }

        let links: Vec<Link> = links.into_iter().map(Link::from).collect();
        let mut outgoing: AHashMap<NodeId, Vec<usize>> = AHashMap::new();
        for (position, link) in links.iter().enumerate() {
            outgoing.entry(link.from.clone()).or_default().push(position);
        }

        Flow {
            blocks,
            index,
            links,
            outgoing,
        }
    }
}

impl Flow {
    pub fn builder(definition: FlowDefinition) -> FlowBuilder {
        FlowBuilder::new(definition)
    }

    /// Builds a flow with no type mappings.
    pub fn new(definition: FlowDefinition) -> Self {
        FlowBuilder::new(definition).build()
    }

    pub fn block(&self, id: &NodeId) -> Option<&Block> {
        self.index.get(id).map(|&position| &self.blocks[position])
    }

    /// Outgoing links of a block, in definition order.
    pub fn links_from<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = &'a Link> + use<'a> {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(|&position| &self.links[position])
    }

    pub fn start_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|block| block.is_start())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

//! Syntax Tree Model: nodes for scripts, includes, processes,
//! workflows, functions, params, output blocks, config assignments/blocks,
//! plus generic expression/statement nodes.

pub mod node;

pub use node::{GlobalNodeRef, IncludeVariable, Node, NodeId, NodeKind, ProcessBody, SchemaFieldType};

use slotmap::SlotMap;

/// Per-file arena of nodes, owned exclusively by that file's `SourceUnit`.
/// Replaced wholesale on every successful re-parse; never shared across
/// `SourceUnit` generations.
#[derive(Debug, Default, Clone)]
pub struct SyntaxTree {
    arena: SlotMap<NodeId, Node>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
            root: None,
        }
    }

    pub fn insert(&mut self, node: Node) -> NodeId {
        self.arena.insert(node)
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id)
    }

    pub fn set_doc(&mut self, id: NodeId, doc: Option<String>) {
        if let Some(node) = self.arena.get_mut(id) {
            node.doc_comment = doc;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.arena.iter()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

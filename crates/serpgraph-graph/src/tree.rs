//! The keyword tree: an arena of nodes plus a name index.
//!
//! Nodes are appended, never removed. A name can label several nodes (the same
//! suggestion reached from different parents); the index keeps lookups by name
//! away from tree traversal entirely. Children lists may be shared across
//! parents, so serialization expands them per parent.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Value};

pub type NodeId = usize;

/// How a keyword entered the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    Origin,
    RelatedSearch,
    DisambiguationResult,
    AutocompleteResult,
    AutocorrectForced,
    AutocorrectSuggested,
    PeopleAlsoSearchFor,
}

/// Per-node numeric annotations: metrics plus page-signal counts (0 or 1).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NodeAnnotations {
    pub average_monthly_search_volume: u64,
    pub competition: f64,
    pub map_result: u32,
    pub image_results: u32,
    pub image_mega_block: u32,
    pub answer_box: u32,
    pub knowledge_graph: u32,
}

#[derive(Debug)]
pub struct KeywordNode {
    pub name: String,
    pub kind: KeywordKind,
    /// Whether this name had already been seen when the node was created.
    pub duplicate: bool,
    pub annotations: NodeAnnotations,
    /// Set once the node's expansion has happened, even when it produced no
    /// children. Unexpanded same-name nodes are the attachment targets for the
    /// next round.
    pub expanded: bool,
    pub children: Vec<NodeId>,
}

#[derive(Debug)]
pub struct KeywordTree {
    nodes: Vec<KeywordNode>,
    by_name: HashMap<String, Vec<NodeId>>,
    root: NodeId,
}

impl KeywordTree {
    /// A tree with a single origin node. `origin` is expected to be normalized
    /// already.
    pub fn new(origin: &str) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            by_name: HashMap::new(),
            root: 0,
        };
        tree.root = tree.add_node(origin, KeywordKind::Origin, false);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &KeywordNode {
        &self.nodes[id]
    }

    pub fn add_node(&mut self, name: &str, kind: KeywordKind, duplicate: bool) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(KeywordNode {
            name: name.to_string(),
            kind,
            duplicate,
            annotations: NodeAnnotations::default(),
            expanded: false,
            children: Vec::new(),
        });
        self.by_name.entry(name.to_string()).or_default().push(id);
        id
    }

    /// Every node carrying this name, in creation order.
    pub fn nodes_named(&self, name: &str) -> &[NodeId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes with this name whose expansion has not happened yet.
    pub fn unexpanded_named(&self, name: &str) -> Vec<NodeId> {
        self.nodes_named(name)
            .iter()
            .copied()
            .filter(|&id| !self.nodes[id].expanded)
            .collect()
    }

    /// Attach `children` to `parent` and mark it expanded. An empty slice
    /// still marks the parent, so it stops being an attachment target.
    pub fn attach_children(&mut self, parent: NodeId, children: &[NodeId]) {
        let node = &mut self.nodes[parent];
        node.children = children.to_vec();
        node.expanded = true;
    }

    pub fn annotate(&mut self, id: NodeId, f: impl FnOnce(&mut NodeAnnotations)) {
        f(&mut self.nodes[id].annotations);
    }

    /// Nested JSON rendering rooted at the origin. Shared children are
    /// expanded under each parent.
    pub fn to_json(&self) -> Value {
        self.node_json(self.root)
    }

    fn node_json(&self, id: NodeId) -> Value {
        let node = &self.nodes[id];
        let a = &node.annotations;
        json!({
            "name": node.name,
            "type": node.kind,
            "duplicate": node.duplicate,
            "average_monthly_search_volume": a.average_monthly_search_volume,
            "competition": a.competition,
            "map_result": a.map_result,
            "image_results": a.image_results,
            "image_mega_block": a.image_mega_block,
            "answer_box": a.answer_box,
            "knowledge_graph": a.knowledge_graph,
            "children": node
                .children
                .iter()
                .map(|&child| self.node_json(child))
                .collect::<Vec<_>>(),
        })
    }
}

//! Display filters over a built graph.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::graph::{Edge, Graph, Node};

/// What the user chose to see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    /// Allowed curation statuses; a node with any other status is hidden.
    pub curation_statuses: BTreeSet<String>,
    /// Show context nodes below the sheet (depth > 0).
    pub show_children_from_other_sheets: bool,
    /// Show context nodes above the boundary (depth < 0).
    pub show_parents_from_other_sheets: bool,
    /// Hide nodes deeper than this; `None` is unbounded.
    pub max_child_depth: Option<i32>,
}

impl FilterOptions {
    /// Everything in `graph` visible.
    pub fn permissive(graph: &Graph) -> Self {
        Self {
            curation_statuses: graph.curation_statuses(),
            show_children_from_other_sheets: true,
            show_parents_from_other_sheets: true,
            max_child_depth: None,
        }
    }

    pub fn allows(&self, node: &Node) -> bool {
        if !self.curation_statuses.contains(&node.curation_status) {
            return false;
        }

        // A node without a computed depth counts as infinitely far above.
        let depth = node.visual_depth;
        if let (Some(max), Some(d)) = (self.max_child_depth, depth) {
            if d > max {
                return false;
            }
        }

        node.is_current()
            || depth == Some(0)
            || (depth.map_or(true, |d| d < 0) && self.show_parents_from_other_sheets)
            || (depth.is_some_and(|d| d > 0) && self.show_children_from_other_sheets)
    }
}

/// The visible part of a graph, edges split by rendering treatment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredGraph {
    pub nodes: Vec<Node>,
    pub hierarchy_edges: Vec<Edge>,
    pub relation_edges: Vec<Edge>,
}

/// Apply display filters; edges survive only when both endpoints do.
pub fn apply_filters(graph: &Graph, options: &FilterOptions) -> FilteredGraph {
    let nodes: Vec<Node> = graph
        .nodes()
        .filter(|n| options.allows(n))
        .cloned()
        .collect();
    let visible: AHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let mut out = FilteredGraph::default();
    for edge in graph.edges() {
        if !visible.contains(edge.source.as_str()) || !visible.contains(edge.target.as_str()) {
            continue;
        }
        if edge.kind.is_hierarchy() {
            out.hierarchy_edges.push(edge.clone());
        } else {
            out.relation_edges.push(edge.clone());
        }
    }
    tracing::debug!(
        nodes = nodes.len(),
        hidden = graph.node_count() - nodes.len(),
        "display filters applied"
    );
    out.nodes = nodes;
    out
}

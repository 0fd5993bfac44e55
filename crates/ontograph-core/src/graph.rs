use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::term::Provenance;

/// A term as placed in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node ID (see [`crate::node_id`]); unique within a graph.
    pub id: String,
    /// The stable term ID this node was derived from.
    pub term_id: String,
    pub label: String,
    pub curation_status: String,
    pub origin: String,
    pub provenance: Provenance,
    pub is_selected: bool,
    /// Layered layout hint; `None` until the depth pass has run.
    pub visual_depth: Option<i32>,
}

impl Node {
    pub fn is_current(&self) -> bool {
        self.provenance == Provenance::Current
    }
}

/// Serialized as a bare string: `"hierarchy"` or the relation name. A
/// relation literally named `hierarchy` reads back as a hierarchy edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Subclass-of, pointing parent → child.
    Hierarchy,
    /// A named semantic relation, pointing term → target.
    Relation(String),
}

const HIERARCHY_TYPE: &str = "hierarchy";

impl EdgeKind {
    pub fn is_hierarchy(&self) -> bool {
        matches!(self, Self::Hierarchy)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Hierarchy => HIERARCHY_TYPE,
            Self::Relation(name) => name,
        }
    }
}

impl Serialize for EdgeKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EdgeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        if name == HIERARCHY_TYPE {
            Ok(Self::Hierarchy)
        } else {
            Ok(Self::Relation(name))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Edge {
    pub fn hierarchy(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            source: parent.into(),
            target: child.into(),
            kind: EdgeKind::Hierarchy,
            label: None,
            color: None,
        }
    }

    pub fn relation(
        source: impl Into<String>,
        target: impl Into<String>,
        relation: &str,
        color: &str,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Relation(relation.to_string()),
            label: Some(relation.to_string()),
            color: Some(color.to_string()),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Node counts per provenance class and edge counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub current: usize,
    pub dependency: usize,
    pub derived: usize,
    pub hierarchy_edges: usize,
    pub relation_edges: usize,
}

/// Directed multigraph of terms.
///
/// Nodes are keyed by ID (idempotent upsert); edges are kept in insertion
/// order and may reference IDs that are not (or no longer) nodes. Queries
/// skip such dangling edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing any node with the same ID.
    /// Returns the replaced node.
    pub fn add_node(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id.clone(), node)
    }

    /// Append an edge. Endpoints are not validated.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Remove a node and every edge referencing it.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let removed = self.nodes.remove(id)?;
        self.edges.retain(|e| !e.touches(id));
        Some(removed)
    }

    /// Keep only the nodes for which `keep` returns true, dropping the edges
    /// of every removed node. Returns how many nodes were removed.
    pub fn retain_nodes<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Node) -> bool,
    {
        let before = self.nodes.len();
        let mut removed: BTreeSet<String> = BTreeSet::new();
        self.nodes.retain(|id, node| {
            let kept = keep(node);
            if !kept {
                removed.insert(id.clone());
            }
            kept
        });
        if !removed.is_empty() {
            self.edges
                .retain(|e| !removed.contains(&e.source) && !removed.contains(&e.target));
        }
        before - self.nodes.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in ID order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_of_kind(&self, hierarchy: bool) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(move |e| e.kind.is_hierarchy() == hierarchy)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes one incoming edge away, in edge-insertion order, without
    /// duplicates and never including `id` itself.
    pub fn predecessors(&self, id: &str) -> Vec<&Node> {
        self.neighbours(id, |e| (&e.target, &e.source))
    }

    /// Nodes one outgoing edge away, in edge-insertion order, without
    /// duplicates and never including `id` itself.
    pub fn successors(&self, id: &str) -> Vec<&Node> {
        self.neighbours(id, |e| (&e.source, &e.target))
    }

    fn neighbours<'a, F>(&'a self, id: &str, ends: F) -> Vec<&'a Node>
    where
        F: Fn(&'a Edge) -> (&'a String, &'a String),
    {
        let mut out: Vec<&Node> = Vec::new();
        for edge in &self.edges {
            let (this, other) = ends(edge);
            if this != id || other == id {
                continue;
            }
            if let Some(node) = self.nodes.get(other) {
                if !out.iter().any(|n| n.id == node.id) {
                    out.push(node);
                }
            }
        }
        out
    }

    /// Nodes with no outgoing edge to another node.
    pub fn leaves(&self) -> Vec<&Node> {
        let adjacency = self.adjacency();
        let found = self
            .nodes()
            .filter(|n| adjacency.successors(&n.id).is_empty())
            .collect();
        found
    }

    /// Nodes with no incoming edge from another node.
    pub fn roots(&self) -> Vec<&Node> {
        let adjacency = self.adjacency();
        let found = self
            .nodes()
            .filter(|n| adjacency.predecessors(&n.id).is_empty())
            .collect();
        found
    }

    /// Precomputed neighbour lists for traversals over the whole graph.
    pub fn adjacency(&self) -> Adjacency<'_> {
        let mut adjacency = Adjacency::default();
        for edge in &self.edges {
            if edge.source == edge.target
                || !self.nodes.contains_key(&edge.source)
                || !self.nodes.contains_key(&edge.target)
            {
                continue;
            }
            let out = adjacency.outgoing.entry(edge.source.as_str()).or_default();
            if !out.contains(&edge.target.as_str()) {
                out.push(edge.target.as_str());
            }
            let inc = adjacency.incoming.entry(edge.target.as_str()).or_default();
            if !inc.contains(&edge.source.as_str()) {
                inc.push(edge.source.as_str());
            }
        }
        adjacency
    }

    /// Write a computed depth map onto the nodes.
    pub fn apply_depths(&mut self, depths: &BTreeMap<String, i32>) {
        for (id, depth) in depths {
            if let Some(node) = self.nodes.get_mut(id) {
                node.visual_depth = Some(*depth);
            }
        }
    }

    /// Smallest and largest computed depth, if any node has one.
    pub fn depth_range(&self) -> Option<(i32, i32)> {
        let mut depths = self.nodes().filter_map(|n| n.visual_depth);
        let first = depths.next()?;
        Some(depths.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Distinct curation statuses present, sorted.
    pub fn curation_statuses(&self) -> BTreeSet<String> {
        self.nodes().map(|n| n.curation_status.clone()).collect()
    }

    pub fn summary(&self) -> GraphSummary {
        let mut summary = GraphSummary::default();
        for node in self.nodes() {
            match node.provenance {
                Provenance::Current => summary.current += 1,
                Provenance::Dependency => summary.dependency += 1,
                Provenance::Derived => summary.derived += 1,
            }
        }
        for edge in &self.edges {
            if edge.kind.is_hierarchy() {
                summary.hierarchy_edges += 1;
            } else {
                summary.relation_edges += 1;
            }
        }
        summary
    }
}

/// Borrowed neighbour index over a [`Graph`]: self-edges, dangling edges
/// and parallel edges are collapsed away.
#[derive(Debug, Default)]
pub struct Adjacency<'g> {
    outgoing: AHashMap<&'g str, Vec<&'g str>>,
    incoming: AHashMap<&'g str, Vec<&'g str>>,
}

impl<'g> Adjacency<'g> {
    pub fn successors(&self, id: &str) -> &[&'g str] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn predecessors(&self, id: &str) -> &[&'g str] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn neighbours(&self, id: &str, direction: Direction) -> &[&'g str] {
        match direction {
            Direction::Upstream => self.predecessors(id),
            Direction::Downstream => self.successors(id),
        }
    }

    /// Every node reachable from `seeds` (seeds included) by repeatedly
    /// following edges in one direction. Iterative, so cycles and long
    /// chains are fine.
    pub fn reachable<I>(&self, seeds: I, direction: Direction) -> AHashSet<&'g str>
    where
        I: IntoIterator<Item = &'g str>,
    {
        let mut seen: AHashSet<&'g str> = AHashSet::new();
        let mut stack: Vec<&'g str> = Vec::new();
        for seed in seeds {
            if seen.insert(seed) {
                stack.push(seed);
            }
        }
        while let Some(id) = stack.pop() {
            for &next in self.neighbours(id, direction) {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }
}

/// Which way to walk edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards predecessors (roots).
    Upstream,
    /// Towards successors (leaves).
    Downstream,
}

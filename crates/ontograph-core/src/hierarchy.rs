//! Subclass forests for tree-style rendering.
//!
//! Each node is placed exactly once. A node with several parents appears
//! under whichever parent reaches it first in a depth-first walk from the
//! roots (roots in input order, children in edge order). Nodes only
//! reachable through a cycle are promoted to roots in input order.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::graph::{Edge, Node};
use crate::term::Provenance;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    pub id: String,
    pub term_id: String,
    pub label: String,
    pub curation_status: String,
    pub origin: String,
    pub provenance: Provenance,
    pub is_selected: bool,
    pub visual_depth: Option<i32>,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    fn leaf(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            term_id: node.term_id.clone(),
            label: node.label.clone(),
            curation_status: node.curation_status.clone(),
            origin: node.origin.clone(),
            provenance: node.provenance,
            is_selected: node.is_selected,
            visual_depth: node.visual_depth,
            children: Vec::new(),
        }
    }

    /// Nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(n) = stack.pop() {
            count += 1;
            stack.extend(n.children.iter());
        }
        count
    }

    /// Preorder IDs of this subtree.
    pub fn preorder_ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(n) = stack.pop() {
            out.push(n.id.as_str());
            stack.extend(n.children.iter().rev());
        }
        out
    }
}

impl Drop for HierarchyNode {
    // Iterative, so dropping a deep chain cannot overflow the stack.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Arrange `nodes` into a forest along `hierarchy_edges`.
///
/// Relation edges, self loops and edges touching unknown nodes are ignored.
pub fn build_hierarchy_trees(nodes: &[Node], hierarchy_edges: &[Edge]) -> Vec<HierarchyNode> {
    let index: AHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut has_parent = vec![false; nodes.len()];
    for edge in hierarchy_edges.iter().filter(|e| e.kind.is_hierarchy()) {
        let (Some(&parent), Some(&child)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if parent == child || children[parent].contains(&child) {
            continue;
        }
        children[parent].push(child);
        has_parent[child] = true;
    }

    // Claim nodes in preorder; `tree_children` keeps claim order.
    let mut placed = vec![false; nodes.len()];
    let mut preorder: Vec<usize> = Vec::with_capacity(nodes.len());
    let mut tree_children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots: Vec<usize> = Vec::new();

    let starts = (0..nodes.len())
        .filter(|&i| !has_parent[i])
        .chain(0..nodes.len());
    for start in starts {
        if placed[start] {
            continue;
        }
        roots.push(start);
        let mut stack: Vec<(usize, Option<usize>)> = vec![(start, None)];
        while let Some((i, parent)) = stack.pop() {
            if placed[i] {
                continue;
            }
            placed[i] = true;
            preorder.push(i);
            if let Some(p) = parent {
                tree_children[p].push(i);
            }
            for &c in children[i].iter().rev() {
                if !placed[c] {
                    stack.push((c, Some(i)));
                }
            }
        }
    }

    // Children are always claimed after their tree parent.
    let mut built: Vec<Option<HierarchyNode>> = vec![None; nodes.len()];
    for &i in preorder.iter().rev() {
        let mut tree = HierarchyNode::leaf(&nodes[i]);
        tree.children = tree_children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(tree);
    }

    let forest: Vec<HierarchyNode> = roots.iter().filter_map(|&r| built[r].take()).collect();
    tracing::debug!(roots = forest.len(), nodes = nodes.len(), "hierarchy forest built");
    forest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::node;

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter().map(|id| node(id, Provenance::Current)).collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs.iter().map(|(s, t)| Edge::hierarchy(*s, *t)).collect()
    }

    fn shape(tree: &HierarchyNode) -> String {
        if tree.children.is_empty() {
            return tree.id.clone();
        }
        let inner: Vec<String> = tree.children.iter().map(shape).collect();
        format!("{}({})", tree.id, inner.join(","))
    }

    #[test]
    fn simple_tree() {
        let forest = build_hierarchy_trees(
            &nodes(&["animal", "cat", "dog"]),
            &edges(&[("animal", "dog"), ("animal", "cat")]),
        );
        assert_eq!(forest.len(), 1);
        assert_eq!(shape(&forest[0]), "animal(dog,cat)");
    }

    #[test]
    fn multi_parent_node_is_placed_once() {
        let forest = build_hierarchy_trees(
            &nodes(&["a", "b", "c", "d"]),
            &edges(&[("a", "c"), ("b", "c"), ("c", "d")]),
        );
        let shapes: Vec<String> = forest.iter().map(shape).collect();
        assert_eq!(shapes, vec!["a(c(d))", "b"]);
        let total: usize = forest.iter().map(HierarchyNode::size).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn pure_cycle_becomes_a_root() {
        let forest = build_hierarchy_trees(
            &nodes(&["x", "y", "z"]),
            &edges(&[("y", "z"), ("z", "y")]),
        );
        let shapes: Vec<String> = forest.iter().map(shape).collect();
        assert_eq!(shapes, vec!["x", "y(z)"]);
    }

    #[test]
    fn ignores_relations_self_loops_and_unknown_nodes() {
        let mut all = edges(&[("a", "a"), ("a", "ghost"), ("ghost", "b")]);
        all.push(Edge::relation("a", "b", "part of", "#000"));
        let forest = build_hierarchy_trees(&nodes(&["a", "b"]), &all);
        let shapes: Vec<String> = forest.iter().map(shape).collect();
        assert_eq!(shapes, vec!["a", "b"]);
    }

    #[test]
    fn carries_node_attributes() {
        let mut input = nodes(&["root"]);
        input[0].visual_depth = Some(1);
        input[0].is_selected = true;
        let forest = build_hierarchy_trees(&input, &[]);
        assert_eq!(forest[0].visual_depth, Some(1));
        assert!(forest[0].is_selected);
        assert_eq!(forest[0].curation_status, "Released");
    }

    #[test]
    fn deep_chain_is_iterative() {
        let ids: Vec<String> = (0..200_000).map(|i| format!("n{i}")).collect();
        let input: Vec<Node> = ids.iter().map(|id| node(id, Provenance::Current)).collect();
        let chain: Vec<Edge> = ids
            .windows(2)
            .map(|w| Edge::hierarchy(w[0].as_str(), w[1].as_str()))
            .collect();
        let forest = build_hierarchy_trees(&input, &chain);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].size(), 200_000);
        assert_eq!(forest[0].preorder_ids().len(), 200_000);
        drop(forest);
    }
}

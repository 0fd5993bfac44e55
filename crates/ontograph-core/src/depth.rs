//! Visual depth: a layered layout hint relative to the current sheet.
//!
//! Rules, applied per node:
//! - a non-current node with at least one successor that is not a
//!   dependency sits on the boundary right above the sheet: depth `0`;
//! - a current node: `max(predecessor depths, 0) + 1`, so current nodes
//!   start at `1`;
//! - any other non-current node: `max(predecessor depths, -1)`.
//!
//! The pass is memoized and runs on an explicit stack. A predecessor that
//! is still being computed (a cycle) contributes `-1`.

use ahash::AHashMap;
use std::collections::BTreeMap;

use crate::graph::{Adjacency, Graph};
use crate::term::Provenance;

#[derive(Debug, Clone, Copy)]
enum Mark {
    InProgress,
    Done(i32),
}

/// Compute the depth of every node without touching the graph.
pub fn compute_visual_depths(graph: &Graph) -> BTreeMap<String, i32> {
    let adjacency = graph.adjacency();
    let mut memo: AHashMap<&str, Mark> = AHashMap::with_capacity(graph.node_count());

    for start in graph.nodes() {
        if memo.contains_key(start.id.as_str()) {
            continue;
        }

        // (node, predecessors already scheduled)
        let mut stack: Vec<(&str, bool)> = vec![(start.id.as_str(), false)];
        while let Some(&(id, expanded)) = stack.last() {
            if !expanded {
                if memo.contains_key(id) {
                    stack.pop();
                    continue;
                }
                if let Some(depth) = boundary_depth(graph, &adjacency, id) {
                    memo.insert(id, Mark::Done(depth));
                    stack.pop();
                    continue;
                }
                memo.insert(id, Mark::InProgress);
                if let Some(top) = stack.last_mut() {
                    top.1 = true;
                }
                for &pred in adjacency.predecessors(id).iter().rev() {
                    if !memo.contains_key(pred) {
                        stack.push((pred, false));
                    }
                }
                continue;
            }

            stack.pop();
            let deepest_parent = adjacency
                .predecessors(id)
                .iter()
                .map(|pred| match memo.get(pred) {
                    Some(Mark::Done(d)) => *d,
                    _ => -1,
                })
                .max();
            let is_current = graph
                .node(id)
                .is_some_and(|n| n.provenance == Provenance::Current);
            let depth = if is_current {
                deepest_parent.unwrap_or(0).max(0) + 1
            } else {
                deepest_parent.unwrap_or(-1).max(-1)
            };
            memo.insert(id, Mark::Done(depth));
        }
    }

    let depths: BTreeMap<String, i32> = memo
        .into_iter()
        .filter_map(|(id, mark)| match mark {
            Mark::Done(d) => Some((id.to_string(), d)),
            Mark::InProgress => None,
        })
        .collect();
    tracing::debug!(nodes = depths.len(), "visual depths computed");
    depths
}

/// Depth `0` for the shallowest context nodes actually used by the sheet.
fn boundary_depth(graph: &Graph, adjacency: &Adjacency<'_>, id: &str) -> Option<i32> {
    let node = graph.node(id)?;
    if node.provenance == Provenance::Current {
        return None;
    }
    adjacency
        .successors(id)
        .iter()
        .filter_map(|s| graph.node(s))
        .any(|s| s.provenance != Provenance::Dependency)
        .then_some(0)
}

/// Compute depths and write them onto the graph.
pub fn assign_visual_depths(graph: &mut Graph) {
    let depths = compute_visual_depths(graph);
    graph.apply_depths(&depths);
}

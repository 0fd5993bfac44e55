//! Graph building: resolved terms → pruned, depth-annotated graph.

use ahash::AHashSet;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::BuildConfig;
use crate::depth::assign_visual_depths;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::BuildError;
use crate::graph::{Direction, Edge, Graph, Node};
use crate::node_id::encode_node_id;
use crate::resolver::{resolve_into, ResolvedTerms};
use crate::sheet::{parse_rows, SheetSnapshot};
use crate::term::{DependencyPayload, Provenance, ResolvedTermData, TermRecord};

/// A built graph plus everything that was dropped on the way.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub graph: Graph,
    pub diagnostics: Vec<Diagnostic>,
    /// Context nodes removed because they do not connect to the sheet.
    pub pruned: usize,
}

impl BuildReport {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: BuildConfig,
}

impl GraphBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the term graph for the sheet being edited.
    ///
    /// `selected_rows` are row indices highlighted in the sheet. When the
    /// list is non-empty the graph is restricted to the selected nodes and
    /// everything above and below them; indices that match no node leave
    /// an empty graph.
    pub fn build(
        &self,
        sheet: &SheetSnapshot,
        payload: &DependencyPayload,
        selected_rows: &[usize],
    ) -> Result<BuildReport, BuildError> {
        let mut sink = DiagnosticSink::default();

        let current = parse_rows(sheet, &self.config, &mut sink)?;
        let dependencies = self.context_records(&payload.dependencies, Provenance::Dependency)?;
        let derived = self.context_records(&payload.derived, Provenance::Derived)?;
        let resolved = resolve_into(current, dependencies, derived, &mut sink);

        let mut selected: BTreeSet<usize> = BTreeSet::new();
        for &row in selected_rows {
            if row < sheet.rows.len() {
                selected.insert(row);
            } else {
                sink.push(DiagnosticKind::SelectionOutOfRange { row });
            }
        }

        let mut graph = self.emit(&resolved, &selected);
        let pruned = prune_unreachable(&mut graph);
        assign_visual_depths(&mut graph);
        if !selected_rows.is_empty() {
            restrict_to_selection(&mut graph);
        }

        tracing::debug!(
            sheet = %sheet.sheet_name,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            pruned,
            selected = selected.len(),
            "term graph built"
        );

        Ok(BuildReport {
            graph,
            diagnostics: sink.into_vec(),
            pruned,
        })
    }

    fn context_records(
        &self,
        terms: &[ResolvedTermData],
        provenance: Provenance,
    ) -> Result<Vec<TermRecord>, BuildError> {
        terms
            .iter()
            .map(|t| {
                if t.id.trim().is_empty() {
                    return Err(BuildError::EmptyTermId {
                        label: t.label.clone(),
                    });
                }
                Ok(t.clone().into_record(
                    provenance,
                    &self.config.default_curation_status,
                    &self.config.unknown_origin,
                ))
            })
            .collect()
    }

    /// One node per term, one edge per resolved parent and relation.
    fn emit(&self, resolved: &ResolvedTerms, selected: &BTreeSet<usize>) -> Graph {
        let mut graph = Graph::new();
        for term in resolved.terms.values() {
            graph.add_node(Node {
                id: encode_node_id(&term.id),
                term_id: term.id.clone(),
                label: term.display_label().to_string(),
                curation_status: term.curation_status.clone(),
                origin: term.origin.clone(),
                provenance: term.provenance,
                is_selected: term.row_indices.iter().any(|r| selected.contains(r)),
                visual_depth: None,
            });
        }

        let palette = &self.config.palette;
        for term in resolved.terms.values() {
            let child = encode_node_id(&term.id);
            for parent in &term.parent_ids {
                graph.add_edge(Edge::hierarchy(encode_node_id(parent), child.clone()));
            }
            for relation in &term.relations {
                graph.add_edge(Edge::relation(
                    child.clone(),
                    encode_node_id(&relation.target_id),
                    &relation.relation,
                    palette.color_for(&relation.relation),
                ));
            }
        }
        graph
    }
}

/// Remove context nodes that do not connect to the current sheet.
///
/// A dependency node stays only if some successor path reaches a current
/// node; a derived node stays only if some predecessor path does. Repeats
/// until stable, so a kept node never relies on a path through a removed
/// one. Returns the number of removed nodes.
pub fn prune_unreachable(graph: &mut Graph) -> usize {
    let mut total = 0;
    loop {
        let doomed: AHashSet<String> = {
            let adjacency = graph.adjacency();
            let current: Vec<&str> = graph
                .nodes()
                .filter(|n| n.provenance == Provenance::Current)
                .map(|n| n.id.as_str())
                .collect();
            let feeds_current = adjacency.reachable(current.iter().copied(), Direction::Upstream);
            let fed_by_current =
                adjacency.reachable(current.iter().copied(), Direction::Downstream);

            let doomed = graph
                .nodes()
                .filter(|n| match n.provenance {
                    Provenance::Current => false,
                    Provenance::Dependency => !feeds_current.contains(n.id.as_str()),
                    Provenance::Derived => !fed_by_current.contains(n.id.as_str()),
                })
                .map(|n| n.id.clone())
                .collect();
            doomed
        };
        if doomed.is_empty() {
            break;
        }
        for id in &doomed {
            tracing::trace!(node = %id, "pruned unreachable context node");
        }
        total += graph.retain_nodes(|n| !doomed.contains(&n.id));
    }
    if total > 0 {
        tracing::debug!(pruned = total, "pruned context nodes unreachable from the sheet");
    }
    total
}

/// Keep the selected nodes plus everything upstream and downstream of them.
pub fn restrict_to_selection(graph: &mut Graph) -> usize {
    let keep: AHashSet<String> = {
        let adjacency = graph.adjacency();
        let selected: Vec<&str> = graph
            .nodes()
            .filter(|n| n.is_selected)
            .map(|n| n.id.as_str())
            .collect();
        let up = adjacency.reachable(selected.iter().copied(), Direction::Upstream);
        let down = adjacency.reachable(selected.iter().copied(), Direction::Downstream);
        let keep = up.union(&down).map(|id| id.to_string()).collect();
        keep
    };
    graph.retain_nodes(|n| keep.contains(&n.id))
}

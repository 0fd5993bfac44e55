//! Output renderers for a filtered term graph.
//!
//! - JSON: the filtered node/edge lists plus diagnostics (for frontends)
//! - Graphviz DOT: provenance-styled nodes, palette-colored relation edges
//! - Tree: the hierarchy forest as JSON

use anyhow::{anyhow, Result};
use serde::Serialize;

use ontograph_core::{
    build_hierarchy_trees, Diagnostic, FilteredGraph, GraphSummary, HierarchyNode, Node,
    Provenance,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VizFormat {
    Json,
    Dot,
    Tree,
}

impl VizFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "dot" | "gv" => Ok(Self::Dot),
            "tree" => Ok(Self::Tree),
            other => Err(anyhow!(
                "unknown output format `{other}` (expected json|dot|tree)"
            )),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphDocument<'a> {
    summary: GraphSummary,
    pruned: usize,
    #[serde(flatten)]
    graph: &'a FilteredGraph,
    diagnostics: &'a [Diagnostic],
}

#[derive(Debug, Serialize)]
struct TreeDocument<'a> {
    roots: Vec<HierarchyNode>,
    diagnostics: &'a [Diagnostic],
}

pub fn render(
    format: VizFormat,
    graph: &FilteredGraph,
    summary: GraphSummary,
    pruned: usize,
    diagnostics: &[Diagnostic],
) -> Result<String> {
    let text = match format {
        VizFormat::Json => serde_json::to_string_pretty(&GraphDocument {
            summary,
            pruned,
            graph,
            diagnostics,
        })?,
        VizFormat::Tree => serde_json::to_string_pretty(&TreeDocument {
            roots: build_hierarchy_trees(&graph.nodes, &graph.hierarchy_edges),
            diagnostics,
        })?,
        VizFormat::Dot => render_dot(graph),
    };
    Ok(text)
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn node_attrs(node: &Node) -> Vec<String> {
    let mut attrs = Vec::new();
    let depth = node
        .visual_depth
        .map(|d| d.to_string())
        .unwrap_or_else(|| "?".to_string());
    attrs.push(format!(
        "label=\"{}\\n{}\\n[{}] d={}\"",
        dot_escape(&node.label),
        dot_escape(&node.term_id),
        dot_escape(&node.curation_status),
        depth
    ));
    match node.provenance {
        Provenance::Current => {
            attrs.push("style=filled".to_string());
            attrs.push("fillcolor=\"#dbeafe\"".to_string());
        }
        Provenance::Dependency => {
            attrs.push("style=dashed".to_string());
            attrs.push("color=\"#6b7280\"".to_string());
        }
        Provenance::Derived => {
            attrs.push("style=dotted".to_string());
            attrs.push("color=\"#6b7280\"".to_string());
        }
    }
    if node.is_selected {
        attrs.push("penwidth=2.5".to_string());
    }
    attrs.push(format!("tooltip=\"{}\"", dot_escape(&node.origin)));
    attrs
}

/// Graphviz DOT: one cluster-free digraph, hierarchy edges solid black,
/// relation edges dashed in their palette color.
pub fn render_dot(graph: &FilteredGraph) -> String {
    let mut out = String::new();
    out.push_str("digraph ontograph {\n");
    out.push_str("  rankdir=TB;\n");
    out.push_str("  node [shape=box, fontname=\"Helvetica\"];\n");
    out.push_str("  edge [fontname=\"Helvetica\"];\n\n");

    for node in &graph.nodes {
        out.push_str(&format!(
            "  \"{}\" [{}];\n",
            dot_escape(&node.id),
            node_attrs(node).join(", ")
        ));
    }
    if !graph.nodes.is_empty() {
        out.push('\n');
    }

    for edge in &graph.hierarchy_edges {
        out.push_str(&format!(
            "  \"{}\" -> \"{}\";\n",
            dot_escape(&edge.source),
            dot_escape(&edge.target)
        ));
    }
    for edge in &graph.relation_edges {
        let label = edge.label.as_deref().unwrap_or_default();
        let color = edge.color.as_deref().unwrap_or("#999999");
        out.push_str(&format!(
            "  \"{}\" -> \"{}\" [label=\"{}\", color=\"{}\", fontcolor=\"{}\", style=dashed];\n",
            dot_escape(&edge.source),
            dot_escape(&edge.target),
            dot_escape(label),
            dot_escape(color),
            dot_escape(color)
        ));
    }

    out.push_str("}\n");
    out
}

//! Ontograph core: ontology term graph construction and layout analysis
//!
//! This crate turns a flat ontology spreadsheet (the sheet currently being
//! edited) plus externally fetched context terms into a directed graph of
//! terms, and derives the views a renderer needs from it.
//!
//! Pipeline:
//! 1. **Sheet parsing** (`sheet`): rows keyed by the `ID` / `Label` /
//!    `Parent` / `REL '<name>'` column conventions become current-sheet terms.
//! 2. **Term resolution** (`resolver`): parent and relation references given
//!    as labels are resolved to stable IDs across the three provenance sets
//!    (current sheet > dependencies > derived).
//! 3. **Graph building** (`builder`): nodes and hierarchy/relation edges are
//!    emitted, context nodes that do not connect back to the current sheet are
//!    pruned, and a layered visual depth is computed (`depth`).
//! 4. **Views** (`filter`, `hierarchy`): display filters produce flat
//!    node/edge lists and parent → child trees for tree-style rendering.
//!
//! Everything here is synchronous and pure over in-memory snapshots. Data
//! quality problems (unknown labels, rows without an ID, stale selections)
//! never abort a build; they are reported as [`Diagnostic`]s next to a
//! best-effort graph.

pub mod builder;
pub mod config;
pub mod depth;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod graph;
pub mod hierarchy;
pub mod node_id;
pub mod resolver;
pub mod sheet;
pub mod term;

pub use builder::{BuildReport, GraphBuilder};
pub use config::{BuildConfig, RelationPalette};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use error::BuildError;
pub use filter::{apply_filters, FilterOptions, FilteredGraph};
pub use graph::{Edge, EdgeKind, Graph, GraphSummary, Node};
pub use hierarchy::{build_hierarchy_trees, HierarchyNode};
pub use node_id::{decode_node_id, encode_node_id};
pub use resolver::{resolve_terms, ResolvedTerm, ResolvedTerms};
pub use sheet::{parse_current_terms, CellValue, ParsedSheet, SheetRow, SheetSnapshot};
pub use term::{
    DependencyPayload, Provenance, RelationRef, ResolvedTermData, TermIdentifier, TermRecord,
    TermRelation,
};

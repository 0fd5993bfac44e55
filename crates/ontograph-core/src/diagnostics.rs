//! Non-fatal findings accumulated while building a graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::term::Provenance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A sheet row without an ID (usually a row still being typed).
    MissingId { row: usize },
    UnresolvedParent {
        term_id: String,
        parent_label: String,
    },
    UnresolvedRelationTarget {
        term_id: String,
        relation: String,
        target_label: String,
    },
    /// A selected row index that does not exist in the sheet.
    SelectionOutOfRange { row: usize },
    /// A sheet row repeating the ID of an earlier row. The earlier row's
    /// parents and relations are kept; selecting either row selects the term.
    DuplicateId { id: String, row: usize },
    /// Two different terms share a label; the lower-precedence one is not
    /// reachable by label.
    ShadowedLabel {
        label: String,
        kept_id: String,
        kept_provenance: Provenance,
        shadowed_id: String,
        shadowed_provenance: Provenance,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind) -> Self {
        let severity = match kind {
            DiagnosticKind::MissingId { .. } | DiagnosticKind::ShadowedLabel { .. } => {
                Severity::Info
            }
            DiagnosticKind::UnresolvedParent { .. }
            | DiagnosticKind::UnresolvedRelationTarget { .. }
            | DiagnosticKind::SelectionOutOfRange { .. }
            | DiagnosticKind::DuplicateId { .. } => Severity::Warning,
        };
        Self { severity, kind }
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::MissingId { row } => write!(f, "row {row} has no ID; skipped"),
            DiagnosticKind::UnresolvedParent {
                term_id,
                parent_label,
            } => write!(f, "{term_id}: parent `{parent_label}` not found; dropped"),
            DiagnosticKind::UnresolvedRelationTarget {
                term_id,
                relation,
                target_label,
            } => write!(
                f,
                "{term_id}: target `{target_label}` of relation `{relation}` not found; relation dropped"
            ),
            DiagnosticKind::SelectionOutOfRange { row } => {
                write!(f, "selected row {row} does not exist; ignored")
            }
            DiagnosticKind::DuplicateId { id, row } => {
                write!(f, "row {row} repeats ID {id}; its parents and relations are ignored")
            }
            DiagnosticKind::ShadowedLabel {
                label,
                kept_id,
                kept_provenance,
                shadowed_id,
                shadowed_provenance,
            } => write!(
                f,
                "label `{label}` resolves to {kept_id} ({kept_provenance}); {shadowed_id} ({shadowed_provenance}) is shadowed"
            ),
        }
    }
}

/// Collects diagnostics and mirrors each one to the tracing subscriber.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticSink {
    items: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub(crate) fn push(&mut self, kind: DiagnosticKind) {
        let diagnostic = Diagnostic::new(kind);
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(diagnostic = %diagnostic, "graph build"),
            Severity::Info => tracing::debug!(diagnostic = %diagnostic, "graph build"),
        }
        self.items.push(diagnostic);
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

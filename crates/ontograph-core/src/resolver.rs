//! Term resolution: labels → stable IDs across provenance classes.
//!
//! Terms from the current sheet reference their parents and relation targets
//! by label. Resolution builds one label index over all terms, honouring the
//! precedence current > dependency > derived (first seen wins inside a
//! class), then rewrites every reference to a term ID. References that do
//! not resolve are dropped and reported; they never fail the build. A sheet
//! row repeating an earlier row's ID is reported and only contributes its
//! row index.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::term::{Provenance, TermIdentifier, TermRecord, TermRelation};

/// A term with every reference rewritten to a term ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTerm {
    pub id: String,
    pub label: Option<String>,
    pub curation_status: String,
    pub origin: String,
    pub provenance: Provenance,
    /// Sheet rows carrying this ID, in sheet order; empty for context terms.
    pub row_indices: Vec<usize>,
    /// Parent term IDs, in sheet order, without duplicates.
    pub parent_ids: Vec<String>,
    pub relations: Vec<TermRelation>,
}

impl ResolvedTerm {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedTerms {
    /// Term ID → term; the highest-precedence record wins on duplicate IDs.
    pub terms: BTreeMap<String, ResolvedTerm>,
    /// Label → (term ID, provenance) after precedence shadowing.
    label_index: BTreeMap<String, (String, Provenance)>,
    /// Per-provenance label → term ID, before shadowing across classes.
    label_sources: BTreeMap<Provenance, BTreeMap<String, String>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedTerms {
    pub fn get(&self, id: &str) -> Option<&ResolvedTerm> {
        self.terms.get(id)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The term ID a label resolves to.
    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        self.label_index.get(label).map(|(id, _)| id.as_str())
    }

    /// Which provenance class owns a label after shadowing.
    pub fn provenance_of_label(&self, label: &str) -> Option<Provenance> {
        self.label_index.get(label).map(|(_, p)| *p)
    }

    /// Labels as defined by one provenance class, ignoring the other classes.
    pub fn labels_from(&self, provenance: Provenance) -> impl Iterator<Item = (&str, &str)> {
        self.label_sources
            .get(&provenance)
            .into_iter()
            .flat_map(|m| m.iter().map(|(l, id)| (l.as_str(), id.as_str())))
    }

    /// Whether `label` is defined by the given class, shadowed or not.
    pub fn label_defined_in(&self, label: &str, provenance: Provenance) -> bool {
        self.label_sources
            .get(&provenance)
            .is_some_and(|m| m.contains_key(label))
    }
}

/// Resolve the three term sets into one ID-keyed table.
pub fn resolve_terms(
    current: Vec<TermRecord>,
    dependencies: Vec<TermRecord>,
    derived: Vec<TermRecord>,
) -> ResolvedTerms {
    let mut sink = DiagnosticSink::default();
    let mut resolved = resolve_into(current, dependencies, derived, &mut sink);
    resolved.diagnostics = sink.into_vec();
    resolved
}

pub(crate) fn resolve_into(
    current: Vec<TermRecord>,
    dependencies: Vec<TermRecord>,
    derived: Vec<TermRecord>,
    sink: &mut DiagnosticSink,
) -> ResolvedTerms {
    let mut out = ResolvedTerms::default();

    // Precedence order: the first record seen for an ID or label wins.
    let mut records: Vec<TermRecord> = Vec::new();
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut known_ids: AHashMap<String, usize> = AHashMap::new();
    for record in current.into_iter().chain(dependencies).chain(derived) {
        index_label(&mut out, &record, sink);
        if let Some(&kept) = known_ids.get(&record.id) {
            match (record.provenance, record.row_index) {
                (Provenance::Current, Some(row)) => {
                    sink.push(DiagnosticKind::DuplicateId {
                        id: record.id.clone(),
                        row,
                    });
                    rows[kept].push(row);
                }
                _ => tracing::debug!(
                    term_id = %record.id,
                    provenance = %record.provenance,
                    "duplicate term id shadowed by higher-precedence record"
                ),
            }
            continue;
        }
        known_ids.insert(record.id.clone(), records.len());
        rows.push(record.row_index.into_iter().collect());
        records.push(record);
    }

    let lookup = |reference: &TermIdentifier| -> Option<String> {
        if let Some(id) = reference.id.as_deref() {
            if known_ids.contains_key(id) {
                return Some(id.to_string());
            }
        }
        let label = reference.label.as_deref()?;
        out.label_index.get(label).map(|(id, _)| id.clone())
    };

    let mut terms = BTreeMap::new();
    for (record, row_indices) in records.into_iter().zip(rows) {
        let mut parent_ids: Vec<String> = Vec::new();
        for parent in &record.sub_class_of {
            match lookup(parent) {
                Some(id) => {
                    if !parent_ids.contains(&id) {
                        parent_ids.push(id);
                    }
                }
                None => sink.push(DiagnosticKind::UnresolvedParent {
                    term_id: record.id.clone(),
                    parent_label: reference_text(parent),
                }),
            }
        }

        let mut relations = Vec::new();
        for relation in &record.relations {
            let reference = TermIdentifier {
                id: relation.target_id.clone(),
                label: relation.target_label.clone(),
            };
            match lookup(&reference) {
                Some(target_id) => relations.push(TermRelation {
                    relation: relation.relation.clone(),
                    target_id,
                }),
                None => sink.push(DiagnosticKind::UnresolvedRelationTarget {
                    term_id: record.id.clone(),
                    relation: relation.relation.clone(),
                    target_label: reference_text(&reference),
                }),
            }
        }

        terms.insert(
            record.id.clone(),
            ResolvedTerm {
                id: record.id,
                label: record.label,
                curation_status: record.curation_status,
                origin: record.origin,
                provenance: record.provenance,
                row_indices,
                parent_ids,
                relations,
            },
        );
    }

    out.terms = terms;
    out
}

fn index_label(out: &mut ResolvedTerms, record: &TermRecord, sink: &mut DiagnosticSink) {
    let Some(label) = record.label.as_deref() else {
        return;
    };

    out.label_sources
        .entry(record.provenance)
        .or_default()
        .entry(label.to_string())
        .or_insert_with(|| record.id.clone());

    match out.label_index.entry(label.to_string()) {
        Entry::Vacant(e) => {
            e.insert((record.id.clone(), record.provenance));
        }
        Entry::Occupied(e) => {
            let (kept_id, kept_provenance) = e.get();
            if *kept_id != record.id {
                sink.push(DiagnosticKind::ShadowedLabel {
                    label: label.to_string(),
                    kept_id: kept_id.clone(),
                    kept_provenance: *kept_provenance,
                    shadowed_id: record.id.clone(),
                    shadowed_provenance: record.provenance,
                });
            }
        }
    }
}

fn reference_text(reference: &TermIdentifier) -> String {
    reference
        .label
        .clone()
        .or_else(|| reference.id.clone())
        .unwrap_or_default()
}

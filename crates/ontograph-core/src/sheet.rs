//! Current-sheet snapshot and row → term parsing.
//!
//! Column conventions (names configurable through [`BuildConfig`]):
//! - `ID`: stable term ID; rows without one are skipped.
//! - `Label`: display name, also the key parents are referenced by.
//! - `Parent`: `;`-separated parent labels.
//! - `REL '<relation>' ...`: `;`-separated relation target labels.
//! - any column whose name contains "curation status" (case-insensitive).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::BuildConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::BuildError;
use crate::term::{Provenance, RelationRef, TermIdentifier, TermRecord};

/// A spreadsheet cell: string, number, boolean or null.
pub type CellValue = serde_json::Value;

/// One spreadsheet row, column name → cell.
pub type SheetRow = BTreeMap<String, CellValue>;

/// The live state of the sheet being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSnapshot {
    pub sheet_name: String,
    pub header: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl SheetSnapshot {
    pub fn new(sheet_name: impl Into<String>, header: Vec<String>, rows: Vec<SheetRow>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            header,
            rows,
        }
    }
}

/// Current-sheet terms plus what was skipped on the way.
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    pub terms: Vec<TermRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Where each convention lives in a particular header.
#[derive(Debug)]
struct SheetColumns<'a> {
    id: &'a str,
    label: &'a str,
    parent: Option<&'a str>,
    curation_status: Option<&'a str>,
    /// (column name, relation name)
    relations: Vec<(&'a str, String)>,
}

impl<'a> SheetColumns<'a> {
    fn detect(
        snapshot: &'a SheetSnapshot,
        config: &'a BuildConfig,
    ) -> Result<Self, BuildError> {
        let header = &snapshot.header;
        let find = |name: &str| header.iter().map(String::as_str).find(|h| *h == name);

        let require = |name: &'a str| -> Result<&'a str, BuildError> {
            if find(name).is_some() || snapshot.rows.is_empty() {
                Ok(name)
            } else {
                Err(BuildError::MissingColumn {
                    sheet: snapshot.sheet_name.clone(),
                    column: name.to_string(),
                })
            }
        };
        let id = require(config.id_column.as_str())?;
        let label = require(config.label_column.as_str())?;

        let marker = config.curation_status_marker.to_lowercase();
        let curation_status = header
            .iter()
            .map(String::as_str)
            .find(|h| h.to_lowercase().contains(&marker));

        let relation_re = Regex::new(&format!(
            r"^\s*{}\s+'([^']+)'",
            regex::escape(&config.relation_column_prefix)
        ))
        .map_err(|e| BuildError::RelationPattern(e.to_string()))?;
        let relations = header
            .iter()
            .filter_map(|h| {
                let caps = relation_re.captures(h)?;
                Some((h.as_str(), caps[1].trim().to_string()))
            })
            .collect();

        Ok(Self {
            id,
            label,
            parent: find(config.parent_column.as_str()),
            curation_status,
            relations,
        })
    }
}

/// Text content of a cell; `None` for null, missing and blank cells.
fn cell_text(row: &SheetRow, column: &str, row_index: usize) -> Result<Option<String>, BuildError> {
    let text = match row.get(column) {
        None | Some(CellValue::Null) => return Ok(None),
        Some(CellValue::String(s)) => s.trim().to_string(),
        Some(CellValue::Number(n)) => n.to_string(),
        Some(CellValue::Bool(b)) => b.to_string(),
        Some(CellValue::Array(_)) => {
            return Err(invalid_cell(row_index, column, "an array"));
        }
        Some(CellValue::Object(_)) => {
            return Err(invalid_cell(row_index, column, "an object"));
        }
    };
    Ok(if text.is_empty() { None } else { Some(text) })
}

fn invalid_cell(row: usize, column: &str, found: &'static str) -> BuildError {
    BuildError::InvalidCell {
        row,
        column: column.to_string(),
        found,
    }
}

fn split_values(text: Option<String>, separator: char) -> Vec<String> {
    text.map(|t| {
        t.split(separator)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub(crate) fn parse_rows(
    snapshot: &SheetSnapshot,
    config: &BuildConfig,
    sink: &mut DiagnosticSink,
) -> Result<Vec<TermRecord>, BuildError> {
    let columns = SheetColumns::detect(snapshot, config)?;
    let origin = if snapshot.sheet_name.trim().is_empty() {
        config.unknown_origin.clone()
    } else {
        snapshot.sheet_name.clone()
    };

    let mut terms = Vec::with_capacity(snapshot.rows.len());
    for (row_index, row) in snapshot.rows.iter().enumerate() {
        let Some(id) = cell_text(row, columns.id, row_index)? else {
            sink.push(DiagnosticKind::MissingId { row: row_index });
            continue;
        };

        let label = cell_text(row, columns.label, row_index)?;
        let curation_status = match columns.curation_status {
            Some(col) => cell_text(row, col, row_index)?,
            None => None,
        }
        .unwrap_or_else(|| config.default_curation_status.clone());

        let parents = match columns.parent {
            Some(col) => split_values(cell_text(row, col, row_index)?, config.value_separator),
            None => Vec::new(),
        };

        let mut relations = Vec::new();
        for (col, relation) in &columns.relations {
            for target in split_values(cell_text(row, col, row_index)?, config.value_separator) {
                relations.push(RelationRef {
                    relation: relation.clone(),
                    target_id: None,
                    target_label: Some(target),
                });
            }
        }

        terms.push(TermRecord {
            id,
            label,
            curation_status,
            origin: origin.clone(),
            sub_class_of: parents.into_iter().map(TermIdentifier::by_label).collect(),
            relations,
            provenance: Provenance::Current,
            row_index: Some(row_index),
        });
    }
    Ok(terms)
}

/// Parse the rows of the current sheet into current-provenance terms.
pub fn parse_current_terms(
    snapshot: &SheetSnapshot,
    config: &BuildConfig,
) -> Result<ParsedSheet, BuildError> {
    let mut sink = DiagnosticSink::default();
    let terms = parse_rows(snapshot, config, &mut sink)?;
    Ok(ParsedSheet {
        terms,
        diagnostics: sink.into_vec(),
    })
}

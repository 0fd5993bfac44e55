use thiserror::Error;

/// Input shapes the builder cannot work with at all.
///
/// These point at an integration bug between the sheet layer and the
/// builder. Data-quality issues are reported as diagnostics instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("sheet `{sheet}` has no `{column}` column")]
    MissingColumn { sheet: String, column: String },

    #[error("row {row}, column `{column}`: expected a string, number, boolean or null cell, got {found}")]
    InvalidCell {
        row: usize,
        column: String,
        found: &'static str,
    },

    #[error("relation column prefix does not form a valid pattern: {0}")]
    RelationPattern(String),

    #[error("term service returned a term with an empty id (label: {label:?})")]
    EmptyTermId { label: Option<String> },
}

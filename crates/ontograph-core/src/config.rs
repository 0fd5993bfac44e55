//! Build configuration: sheet column conventions and the relation palette.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_CURATION_STATUS: &str = "Pre-proposed";
pub const UNKNOWN_ORIGIN: &str = "<unknown>";
pub const NEUTRAL_EDGE_COLOR: &str = "#999999";

/// Relation label → edge color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationPalette {
    pub colors: BTreeMap<String, String>,
    pub default_color: String,
}

impl Default for RelationPalette {
    fn default() -> Self {
        let colors = [
            ("part of", "#1f77b4"),
            ("has part", "#17becf"),
            ("derives from", "#ff7f0e"),
            ("located in", "#2ca02c"),
            ("participates in", "#9467bd"),
            ("has participant", "#8c564b"),
            ("capable of", "#e377c2"),
            ("regulates", "#d62728"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            colors,
            default_color: NEUTRAL_EDGE_COLOR.to_string(),
        }
    }
}

impl RelationPalette {
    /// An empty palette: every relation gets the default color.
    pub fn neutral() -> Self {
        Self {
            colors: BTreeMap::new(),
            default_color: NEUTRAL_EDGE_COLOR.to_string(),
        }
    }

    pub fn with_color(mut self, relation: &str, color: &str) -> Self {
        self.colors.insert(relation.to_string(), color.to_string());
        self
    }

    pub fn color_for(&self, relation: &str) -> &str {
        self.colors
            .get(relation)
            .map(String::as_str)
            .unwrap_or(&self.default_color)
    }
}

/// Column conventions and sentinels used while reading the current sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub id_column: String,
    pub label_column: String,
    pub parent_column: String,
    /// Relation columns look like `REL '<relation name>' ...`.
    pub relation_column_prefix: String,
    /// Case-insensitive substring identifying the curation status column.
    pub curation_status_marker: String,
    /// Separator for multi-valued cells.
    pub value_separator: char,
    pub default_curation_status: String,
    pub unknown_origin: String,
    pub palette: RelationPalette,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            id_column: "ID".to_string(),
            label_column: "Label".to_string(),
            parent_column: "Parent".to_string(),
            relation_column_prefix: "REL".to_string(),
            curation_status_marker: "curation status".to_string(),
            value_separator: ';',
            default_curation_status: DEFAULT_CURATION_STATUS.to_string(),
            unknown_origin: UNKNOWN_ORIGIN.to_string(),
            palette: RelationPalette::default(),
        }
    }
}

impl BuildConfig {
    pub fn with_palette(mut self, palette: RelationPalette) -> Self {
        self.palette = palette;
        self
    }
}

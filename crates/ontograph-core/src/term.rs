//! Term records and the external dependency payload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a term came from.
///
/// The declaration order is also the label-resolution precedence: when two
/// terms share a label, the one with the smaller provenance wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// A row of the sheet being edited.
    Current,
    /// Ancestor context fetched from the term service.
    Dependency,
    /// Descendant context fetched from the term service.
    Derived,
}

impl Provenance {
    pub const ALL: [Provenance; 3] = [Self::Current, Self::Dependency, Self::Derived];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Dependency => "dependency",
            Self::Derived => "derived",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to a term by stable ID and/or label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TermIdentifier {
    pub fn by_label(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: Some(label.into()),
        }
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            label: None,
        }
    }
}

/// A relation reference as it arrives, before the target is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRef {
    /// Relation name, e.g. `part of`.
    pub relation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
}

/// A resolved relation: the target is a known term ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRelation {
    pub relation: String,
    pub target_id: String,
}

/// One term, from any of the three provenance classes, before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRecord {
    pub id: String,
    pub label: Option<String>,
    pub curation_status: String,
    pub origin: String,
    pub sub_class_of: Vec<TermIdentifier>,
    pub relations: Vec<RelationRef>,
    pub provenance: Provenance,
    /// Index of the originating sheet row (current-sheet terms only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
}

impl TermRecord {
    /// Display label, falling back to the ID.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A term as delivered by the term service (already carries its stable ID).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTermData {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub curation_status: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub sub_class_of: Vec<TermIdentifier>,
    #[serde(default)]
    pub relations: Vec<RelationRef>,
}

impl ResolvedTermData {
    pub(crate) fn into_record(
        self,
        provenance: Provenance,
        default_curation_status: &str,
        unknown_origin: &str,
    ) -> TermRecord {
        TermRecord {
            id: self.id,
            label: self.label.filter(|l| !l.trim().is_empty()),
            curation_status: self
                .curation_status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default_curation_status.to_string()),
            origin: self
                .origin
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| unknown_origin.to_string()),
            sub_class_of: self.sub_class_of,
            relations: self.relations,
            provenance,
            row_index: None,
        }
    }
}

/// Context terms fetched for the current sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyPayload {
    #[serde(default)]
    pub dependencies: Vec<ResolvedTermData>,
    #[serde(default)]
    pub derived: Vec<ResolvedTermData>,
}

impl DependencyPayload {
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.derived.is_empty()
    }
}

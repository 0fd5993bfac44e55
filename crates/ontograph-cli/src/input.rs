//! JSON inputs: the sheet snapshot bundle plus optional config/filter files.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use ontograph_core::{BuildConfig, DependencyPayload, FilterOptions, Graph, SheetSnapshot};

/// Everything one build needs, as a frontend would post it.
///
/// ```json
/// { "sheetName": "animals", "header": ["ID", "Label"], "rows": [...],
///   "payload": { "dependencies": [...], "derived": [...] },
///   "selection": [0, 2] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildInput {
    #[serde(flatten)]
    pub sheet: SheetSnapshot,
    #[serde(default)]
    pub payload: DependencyPayload,
    #[serde(default)]
    pub selection: Vec<usize>,
}

/// Read a JSON document from `path`, or stdin for `-`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> Result<BuildConfig> {
    match path {
        Some(p) => read_json(p),
        None => Ok(BuildConfig::default()),
    }
}

/// Filter options from a file, or everything visible.
pub fn load_filters(path: Option<&Path>, graph: &Graph) -> Result<FilterOptions> {
    match path {
        Some(p) => read_json(p),
        None => Ok(FilterOptions::permissive(graph)),
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Load graph definitions from disk.
//!
//! YAML and JSON files carry the same canonical structure; YAML input is
//! bridged through `serde_json::Value` so both formats share one parser.

use std::fs;
use std::path::Path;

use crate::errors::WireError;
use crate::model::CalculationNode;
use crate::wire::node::node_from_value;

/// Read a `CalculationNode` definition from a `.yaml`/`.yml` or `.json`
/// file; the extension picks the front-end format.
pub fn load_graph(path: impl AsRef<Path>) -> Result<CalculationNode, WireError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| WireError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let value: serde_json::Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
        _ => serde_json::from_str(&text)?,
    };
    node_from_value(&value)
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors produced while encoding, decoding or loading wire-form graphs
//! and evaluation results.

use thiserror::Error;

use crate::errors::GraphError;

#[derive(Error, Debug)]
pub enum WireError {
    /// A node or resource type tag not present in the registry.
    #[error("unknown type tag '{0}'")]
    UnknownType(String),

    /// Structurally invalid wire data.
    #[error("malformed {context}: {detail}")]
    Malformed { context: String, detail: String },

    /// A required field was absent.
    #[error("missing field '{field}' in {context}")]
    MissingField { context: String, field: String },

    /// Registration attempted after the registry was frozen.
    #[error("type registry is frozen; cannot register '{0}'")]
    RegistryFrozen(String),

    /// Decoded data violated a graph invariant.
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl WireError {
    pub fn malformed(context: impl Into<String>, detail: impl Into<String>) -> Self {
        WireError::Malformed {
            context: context.into(),
            detail: detail.into(),
        }
    }

    pub fn missing_field(context: impl Into<String>, field: impl Into<String>) -> Self {
        WireError::MissingField {
            context: context.into(),
            field: field.into(),
        }
    }
}

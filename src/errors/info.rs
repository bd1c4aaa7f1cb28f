// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of failure kinds surfaced in per-resource results.
///
/// Resolution and evaluation never abort an entire call for one bad resource;
/// each affected entry carries an [`ErrorInfo`] with one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No producer was found for a required resource.
    UnresolvedInput,
    /// Multiple producers or multiple targeting flywires, or a flywire
    /// endpoint that does not exist in the tree.
    ConfigurationConflict,
    /// A runtime-observed carried-type mismatch.
    TypeIncompatibility,
    /// Resolution re-entered a frame already on the active stack.
    CycleDetected,
    /// An atomic node returned a failure or panicked in `compute`.
    ComputeFailure,
    /// Malformed structure or missing field on deserialization.
    SerializationError,
    /// A type tag not present in the registry.
    UnknownType,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnresolvedInput => "UnresolvedInput",
            ErrorKind::ConfigurationConflict => "ConfigurationConflict",
            ErrorKind::TypeIncompatibility => "TypeIncompatibility",
            ErrorKind::CycleDetected => "CycleDetected",
            ErrorKind::ComputeFailure => "ComputeFailure",
            ErrorKind::SerializationError => "SerializationError",
            ErrorKind::UnknownType => "UnknownType",
        };
        f.write_str(name)
    }
}

/// A failure value carried inside [`Outcome::Failure`](crate::model::Outcome).
///
/// `ErrorInfo` is data, not control flow: it is stored in evaluation records,
/// compared structurally, and serialized on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ErrorInfo {}

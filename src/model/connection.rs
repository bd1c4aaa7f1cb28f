// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::errors::GraphError;
use crate::model::{NodePath, ResourceId};

/// One endpoint on one node: a `(nodePath, resource)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionPoint {
    pub node_path: NodePath,
    pub resource: ResourceId,
}

impl ConnectionPoint {
    pub fn new(node_path: NodePath, resource: ResourceId) -> Self {
        Self {
            node_path,
            resource,
        }
    }
}

impl fmt::Display for ConnectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.node_path, self.resource)
    }
}

/// An export scope element: `(child name, resource)`.
///
/// Groups scope visibility per child by name, not by absolute path, so a
/// subtree keeps its exports when it is re-rooted. On the wire the child name
/// travels in the `nodePath` field of a connection point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportPoint {
    pub child: String,
    pub resource: ResourceId,
}

impl ExportPoint {
    pub fn new(child: impl Into<String>, resource: ResourceId) -> Self {
        Self {
            child: child.into(),
            resource,
        }
    }
}

impl fmt::Display for ExportPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.child, self.resource)
    }
}

/// Typed redirect: reads addressed to `target` obtain their value from
/// `source` instead.
///
/// Construction enforces the type-safety invariant: the target's carried
/// type must accept the source's carried type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Flywire {
    source: ConnectionPoint,
    target: ConnectionPoint,
}

impl Flywire {
    pub fn new(source: ConnectionPoint, target: ConnectionPoint) -> Result<Self, GraphError> {
        if !target.resource.accepts(&source.resource) {
            return Err(GraphError::IncompatibleFlywire {
                source_path: source.to_string(),
                target: target.to_string(),
            });
        }
        Ok(Self { source, target })
    }

    /// Where the value comes from.
    pub fn source(&self) -> &ConnectionPoint {
        &self.source
    }

    /// Where the value is injected.
    pub fn target(&self) -> &ConnectionPoint {
        &self.target
    }
}

impl fmt::Display for Flywire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dependency resolution diagnostics.

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// Several producers qualified for one resource at the same group level.
pub struct ProducerConflict<'a> {
    pub group: &'a str,
    pub resource: &'a str,
    pub candidates: &'a [String],
}

impl Display for ProducerConflict<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration conflict in {}: {} producible by [{}]",
            self.group,
            self.resource,
            self.candidates.join(", ")
        )
    }
}

impl StructuredLog for ProducerConflict<'_> {
    fn log(&self) {
        tracing::warn!(
            group = self.group,
            resource = self.resource,
            candidates = self.candidates.len(),
            "{}",
            self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "producer_conflict",
            otel.name = name,
            group = self.group,
            resource = self.resource,
        )
    }
}

/// A read request re-entered a resolution frame already on the stack.
pub struct ResolutionCycle<'a> {
    pub path: &'a str,
    pub resource: &'a str,
}

impl Display for ResolutionCycle<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Resolution cycle at {} for {}", self.path, self.resource)
    }
}

impl StructuredLog for ResolutionCycle<'_> {
    fn log(&self) {
        tracing::warn!(path = self.path, resource = self.resource, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "resolution_cycle",
            otel.name = name,
            path = self.path,
            resource = self.resource,
        )
    }
}

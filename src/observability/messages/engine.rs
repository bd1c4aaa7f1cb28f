// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for evaluation lifecycle events.

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// An evaluation call began.
pub struct EvaluationStarted<'a> {
    pub path: &'a str,
    pub requested: usize,
}

impl Display for EvaluationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting evaluation at {}: {} requested resource(s)",
            self.path, self.requested
        )
    }
}

impl StructuredLog for EvaluationStarted<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, requested = self.requested, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluation",
            otel.name = name,
            path = self.path,
            requested = self.requested,
        )
    }
}

/// An atomic node's compute finished.
pub struct NodeComputed<'a> {
    pub path: &'a str,
    pub outputs: usize,
}

impl Display for NodeComputed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Computed {}: {} output(s)", self.path, self.outputs)
    }
}

impl StructuredLog for NodeComputed<'_> {
    fn log(&self) {
        tracing::debug!(path = self.path, outputs = self.outputs, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_compute",
            otel.name = name,
            path = self.path,
            outputs = self.outputs,
        )
    }
}

/// An evaluation call finished.
pub struct EvaluationCompleted<'a> {
    pub path: &'a str,
    pub succeeded: usize,
    pub failed: usize,
}

impl Display for EvaluationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluation at {} completed: {} succeeded, {} failed",
            self.path, self.succeeded, self.failed
        )
    }
}

impl StructuredLog for EvaluationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            succeeded = self.succeeded,
            failed = self.failed,
            "{}",
            self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluation_completed",
            otel.name = name,
            path = self.path,
            succeeded = self.succeeded,
            failed = self.failed,
        )
    }
}

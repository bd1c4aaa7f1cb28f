// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Provenance-annotated evaluation records.
//!
//! Every value the resolver hands to a node, and every value a node
//! produces, is recorded together with *why* it was obtained that way. The
//! full trace of one call is the [`EvaluationResult`].

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{
    AdhocOverride, CalculationNode, NodePath, ResourceId, Snapshot, ValueOutcome,
};

/// How an input value reached its reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSourceType {
    /// Forwarded from the enclosing group's own resolution.
    ByParentGroup,
    /// Produced by a sibling within the innermost group.
    ByResolve,
    /// Redirected through a static flywire.
    ByFlywire,
    /// Redirected through a per-call flywire.
    ByAdhocFlywire,
    /// Injected directly by the per-call override.
    ByAdhoc,
}

/// How an output value came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputValueType {
    /// Returned by the node's `compute`.
    ByEvaluation,
    /// Substituted by the per-call override; `compute` was skipped for it.
    ByAdhoc,
}

/// Provenance of one input entry.
///
/// `is_direct` is `Some(true)` for a declared dependency of the reader,
/// `Some(false)` for a conditional dependency discovered during iteration,
/// and `None` for group-level flows where the notion has no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputContext {
    pub source_type: InputSourceType,
    pub is_direct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputResult {
    pub context: InputContext,
    pub outcome: ValueOutcome,
}

/// Provenance of one output entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputContext {
    pub result_type: OutputValueType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputResult {
    pub context: OutputContext,
    pub outcome: ValueOutcome,
}

/// Per-node record of everything read and produced during one call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeEvaluation {
    pub inputs: IndexMap<ResourceId, InputResult>,
    pub outputs: IndexMap<ResourceId, OutputResult>,
}

impl NodeEvaluation {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

/// The annotated trace of one `evaluate_for_result` call.
///
/// Always produced, even when every requested resource failed; callers
/// inspect per-resource outcomes. `graph` is the extracted sub-graph that
/// reproduces this evaluation when run with the same arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub snapshot: Snapshot,
    pub requested_path: NodePath,
    pub overrides: Option<AdhocOverride>,
    pub results: IndexMap<ResourceId, ValueOutcome>,
    pub node_evaluations: IndexMap<NodePath, NodeEvaluation>,
    pub graph: CalculationNode,
}

impl EvaluationResult {
    /// Number of requested resources that resolved successfully.
    pub fn success_count(&self) -> usize {
        self.results.values().filter(|o| o.is_success()).count()
    }

    /// Number of requested resources that failed.
    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }
}

impl fmt::Display for InputSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputSourceType::ByParentGroup => "ByParentGroup",
            InputSourceType::ByResolve => "ByResolve",
            InputSourceType::ByFlywire => "ByFlywire",
            InputSourceType::ByAdhocFlywire => "ByAdhocFlywire",
            InputSourceType::ByAdhoc => "ByAdhoc",
        };
        f.write_str(name)
    }
}

impl fmt::Display for OutputValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputValueType::ByEvaluation => "ByEvaluation",
            OutputValueType::ByAdhoc => "ByAdhoc",
        };
        f.write_str(name)
    }
}

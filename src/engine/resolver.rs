// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The iterative fixed-point dependency resolver.
//!
//! A read request `(readerPath, resource)` is answered by the first matching
//! rule, in priority order:
//!
//! 1. an adhoc output pinned at the read site,
//! 2. an adhoc flywire targeting the read site,
//! 3. the lexically nearest static flywire (searching the enclosing groups
//!    outward; several matches at one level conflict),
//! 4. an adhoc input at the read site,
//! 5. forwarding from the enclosing group's own resolution,
//! 6. an exported sibling producer inside the innermost group (zero matches
//!    escalate to the parent level, several matches conflict).
//!
//! Atomic nodes are evaluated at most once per call via the iteration
//! protocol: ask the node what it still needs, resolve that, repeat until
//! the need set is empty, then run `compute`. Cycles between read requests
//! are cut by a per-call stack of `(path, resource)` frames.

use std::panic::{catch_unwind, AssertUnwindSafe};

use indexmap::{IndexMap, IndexSet};

use crate::errors::ErrorKind;
use crate::model::{
    AdhocOverride, AtomicNode, CalculationNode, ConnectionPoint, Flywire, InputContext,
    InputResult, InputSourceType, NodeEvaluation, NodePath, Outcome, OutputContext, OutputResult,
    OutputValueType, ResourceId, Snapshot, ValueOutcome,
};
use crate::observability::messages::resolver::{ProducerConflict, ResolutionCycle};
use crate::observability::messages::{engine::NodeComputed, StructuredLog};

/// Per-call resolution state. One `Resolver` serves exactly one
/// `evaluate*` call; the recorded evaluations are handed back to the
/// evaluator when every request has settled.
pub(crate) struct Resolver<'a> {
    root: &'a CalculationNode,
    snapshot: &'a Snapshot,
    overrides: &'a AdhocOverride,
    evaluations: IndexMap<NodePath, NodeEvaluation>,
    /// Atomic nodes whose iteration protocol has completed.
    computed: IndexSet<NodePath>,
    /// Atomic nodes whose iteration protocol is currently running.
    in_progress: IndexSet<NodePath>,
    /// Active `(path, resource)` production frames, outermost first.
    stack: Vec<(NodePath, ResourceId)>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        root: &'a CalculationNode,
        snapshot: &'a Snapshot,
        overrides: &'a AdhocOverride,
    ) -> Self {
        Self {
            root,
            snapshot,
            overrides,
            evaluations: IndexMap::new(),
            computed: IndexSet::new(),
            in_progress: IndexSet::new(),
            stack: Vec::new(),
        }
    }

    /// Resolve one requested resource against the root node.
    pub(crate) fn resolve_request(&mut self, resource: &ResourceId) -> ValueOutcome {
        self.demand_output(&NodePath::root(), resource)
    }

    pub(crate) fn into_evaluations(self) -> IndexMap<NodePath, NodeEvaluation> {
        self.evaluations
    }

    fn node_at(&self, path: &NodePath) -> Option<&'a CalculationNode> {
        self.root.descend(path)
    }

    /// First write wins; a value obtained once is never re-derived within a
    /// call, so later reads observe the identical record.
    fn record_input(
        &mut self,
        path: &NodePath,
        resource: ResourceId,
        context: InputContext,
        outcome: ValueOutcome,
    ) {
        let evaluation = self.evaluations.entry(path.clone()).or_default();
        evaluation
            .inputs
            .entry(resource)
            .or_insert(InputResult { context, outcome });
    }

    fn record_output(
        &mut self,
        path: &NodePath,
        resource: ResourceId,
        result_type: OutputValueType,
        outcome: ValueOutcome,
    ) {
        let evaluation = self.evaluations.entry(path.clone()).or_default();
        evaluation.outputs.entry(resource).or_insert(OutputResult {
            context: OutputContext { result_type },
            outcome,
        });
    }

    fn recorded_output(&self, path: &NodePath, resource: &ResourceId) -> Option<&OutputResult> {
        self.evaluations
            .get(path)
            .and_then(|evaluation| evaluation.outputs.get(resource))
    }

    /// Obtain the value the node at `path` produces for `resource`,
    /// evaluating the node on first demand.
    fn demand_output(&mut self, path: &NodePath, resource: &ResourceId) -> ValueOutcome {
        if let Some(recorded) = self.recorded_output(path, resource) {
            return recorded.outcome.clone();
        }

        let point = ConnectionPoint::new(path.clone(), resource.clone());
        if let Some(substituted) = self.overrides.outputs().get(&point) {
            let outcome = substituted.clone();
            self.record_output(path, resource.clone(), OutputValueType::ByAdhoc, outcome.clone());
            return outcome;
        }

        let frame = (path.clone(), resource.clone());
        if self.stack.contains(&frame) {
            ResolutionCycle {
                path: path.as_str(),
                resource: &resource.to_string(),
            }
            .log();
            return Outcome::fail(
                ErrorKind::CycleDetected,
                format!("resolution of {} at {} re-entered its own frame", resource, path),
            );
        }

        self.stack.push(frame);
        let outcome = self.demand_output_uncached(path, resource);
        self.stack.pop();
        outcome
    }

    fn demand_output_uncached(&mut self, path: &NodePath, resource: &ResourceId) -> ValueOutcome {
        let node = match self.node_at(path) {
            Some(node) => node,
            None => {
                return Outcome::fail(
                    ErrorKind::ConfigurationConflict,
                    format!("no node exists at {}", path),
                );
            }
        };

        match node {
            CalculationNode::Atomic(atomic) => self.demand_atomic_output(path, atomic, resource),
            CalculationNode::Group(_) => self.demand_group_output(path, resource),
        }
    }

    fn demand_atomic_output(
        &mut self,
        path: &NodePath,
        atomic: &'a AtomicNode,
        resource: &ResourceId,
    ) -> ValueOutcome {
        if self.in_progress.contains(path) {
            ResolutionCycle {
                path: path.as_str(),
                resource: &resource.to_string(),
            }
            .log();
            return Outcome::fail(
                ErrorKind::CycleDetected,
                format!("{} demanded while {} is still resolving", resource, path),
            );
        }

        if !self.computed.contains(path) {
            self.in_progress.insert(path.clone());
            self.run_iteration_protocol(path, atomic);
            self.in_progress.swap_remove(path);
            self.computed.insert(path.clone());
        }

        match self.recorded_output(path, resource) {
            Some(recorded) => recorded.outcome.clone(),
            None => Outcome::fail(
                ErrorKind::UnresolvedInput,
                format!("{} did not produce {} with the available inputs", path, resource),
            ),
        }
    }

    fn demand_group_output(&mut self, path: &NodePath, resource: &ResourceId) -> ValueOutcome {
        // The node is known to be a group; re-borrow to keep the tree
        // reference free of the &mut self borrow below.
        let group = match self.node_at(path).and_then(CalculationNode::as_group) {
            Some(group) => group,
            None => {
                return Outcome::fail(
                    ErrorKind::ConfigurationConflict,
                    format!("no group exists at {}", path),
                );
            }
        };

        let producers: Vec<String> = group
            .exported_producers(resource)
            .iter()
            .map(|child| child.name().to_string())
            .collect();

        let outcome = match producers.as_slice() {
            [] => Outcome::fail(
                ErrorKind::UnresolvedInput,
                format!("no exported producer of {} inside {}", resource, path),
            ),
            [only] => self.demand_output(&path.child(only), resource),
            several => {
                let candidates: Vec<String> = several
                    .iter()
                    .map(|name| path.child(name).to_string())
                    .collect();
                ProducerConflict {
                    group: path.as_str(),
                    resource: &resource.to_string(),
                    candidates: &candidates,
                }
                .log();
                Outcome::fail(
                    ErrorKind::ConfigurationConflict,
                    format!(
                        "multiple producers of {} inside {}: {}",
                        resource,
                        path,
                        candidates.join(", ")
                    ),
                )
            }
        };

        self.record_output(
            path,
            resource.clone(),
            OutputValueType::ByEvaluation,
            outcome.clone(),
        );
        outcome
    }

    /// Answer a read request for `resource` issued by the node at `reader`.
    /// Returns the provenance tag to record on the reader together with the
    /// resolved outcome.
    fn resolve_input(
        &mut self,
        reader: &NodePath,
        resource: &ResourceId,
    ) -> (InputSourceType, ValueOutcome) {
        let point = ConnectionPoint::new(reader.clone(), resource.clone());

        // 1. Adhoc output pinned at the read site.
        if let Some(substituted) = self.overrides.outputs().get(&point) {
            return (InputSourceType::ByAdhoc, substituted.clone());
        }

        // 2. Adhoc flywires targeting the read site.
        let adhoc_hits: Vec<&Flywire> = self
            .overrides
            .flywires()
            .iter()
            .filter(|flywire| flywire.target() == &point)
            .collect();
        match adhoc_hits.as_slice() {
            [] => {}
            [only] => {
                let flywire = (*only).clone();
                return (
                    InputSourceType::ByAdhocFlywire,
                    self.follow_flywire(&flywire, true),
                );
            }
            several => {
                return (
                    InputSourceType::ByAdhocFlywire,
                    Outcome::fail(
                        ErrorKind::ConfigurationConflict,
                        format!("{} adhoc flywires target {}", several.len(), point),
                    ),
                );
            }
        }

        // 3. Static flywires, lexically nearest group first.
        let mut level = reader.parent();
        while let Some(group_path) = level {
            if let Some(group) = self.node_at(&group_path).and_then(CalculationNode::as_group) {
                let hits: Vec<&Flywire> = group
                    .flywires()
                    .iter()
                    .filter(|flywire| flywire.target() == &point)
                    .collect();
                match hits.as_slice() {
                    [] => {}
                    [only] => {
                        let flywire = (*only).clone();
                        return (InputSourceType::ByFlywire, self.follow_flywire(&flywire, false));
                    }
                    several => {
                        return (
                            InputSourceType::ByFlywire,
                            Outcome::fail(
                                ErrorKind::ConfigurationConflict,
                                format!(
                                    "{} flywires in {} target {}",
                                    several.len(),
                                    group_path,
                                    point
                                ),
                            ),
                        );
                    }
                }
            }
            level = group_path.parent();
        }

        // 4. Adhoc input at the read site.
        if let Some(injected) = self.overrides.inputs().get(&point) {
            return (InputSourceType::ByAdhoc, injected.clone());
        }

        // 5/6. Resolve within the innermost enclosing group, escalating to
        // the parent level when no exported sibling produces the resource.
        let parent_path = match reader.parent() {
            Some(parent) => parent,
            None => {
                return (
                    InputSourceType::ByResolve,
                    Outcome::fail(
                        ErrorKind::UnresolvedInput,
                        format!("no producer found for {}", resource),
                    ),
                );
            }
        };

        let parent_group = match self
            .node_at(&parent_path)
            .and_then(CalculationNode::as_group)
        {
            Some(group) => group,
            None => {
                return (
                    InputSourceType::ByResolve,
                    Outcome::fail(
                        ErrorKind::ConfigurationConflict,
                        format!("reader {} has no enclosing group", reader),
                    ),
                );
            }
        };

        let reader_name = reader.leaf();
        let siblings: Vec<String> = parent_group
            .exported_producers(resource)
            .iter()
            .filter(|child| child.name() != reader_name)
            .map(|child| child.name().to_string())
            .collect();

        match siblings.as_slice() {
            [only] => (
                InputSourceType::ByResolve,
                self.demand_output(&parent_path.child(only), resource),
            ),
            [] => {
                let (source_type, outcome) = self.resolve_input(&parent_path, resource);
                self.record_input(
                    &parent_path,
                    resource.clone(),
                    InputContext {
                        source_type,
                        is_direct: None,
                    },
                    outcome.clone(),
                );
                (InputSourceType::ByParentGroup, outcome)
            }
            several => {
                let candidates: Vec<String> = several
                    .iter()
                    .map(|name| parent_path.child(name).to_string())
                    .collect();
                ProducerConflict {
                    group: parent_path.as_str(),
                    resource: &resource.to_string(),
                    candidates: &candidates,
                }
                .log();
                (
                    InputSourceType::ByResolve,
                    Outcome::fail(
                        ErrorKind::ConfigurationConflict,
                        format!(
                            "multiple producers of {} inside {}: {}",
                            resource,
                            parent_path,
                            candidates.join(", ")
                        ),
                    ),
                )
            }
        }
    }

    /// Obtain the value behind a flywire's source endpoint. Endpoint
    /// existence is re-checked against the live tree; adhoc wires also
    /// re-check type compatibility, since they bypass the static
    /// construction path of the hosting group.
    fn follow_flywire(&mut self, flywire: &Flywire, adhoc: bool) -> ValueOutcome {
        let source = flywire.source();

        let source_node = match self.node_at(&source.node_path) {
            Some(node) => node,
            None => {
                return Outcome::fail(
                    ErrorKind::ConfigurationConflict,
                    format!("flywire source node {} does not exist", source.node_path),
                );
            }
        };
        if !source_node.outputs().contains(&source.resource) {
            return Outcome::fail(
                ErrorKind::ConfigurationConflict,
                format!(
                    "flywire source {} does not declare output {}",
                    source.node_path, source.resource
                ),
            );
        }
        if adhoc && !flywire.target().resource.accepts(&source.resource) {
            return Outcome::fail(
                ErrorKind::TypeIncompatibility,
                format!(
                    "{} cannot feed {}",
                    source.resource,
                    flywire.target().resource
                ),
            );
        }

        self.demand_output(&source.node_path, &source.resource)
    }

    /// The per-node iteration protocol: repeatedly ask the node what it
    /// still needs, resolve those reads, then compute. Termination rests on
    /// the monotonicity contract of `resolve_dependencies`: every requested
    /// resource enters `known` (as success or failure), so the need set
    /// shrinks to empty.
    fn run_iteration_protocol(&mut self, path: &NodePath, atomic: &'a AtomicNode) {
        let behavior = atomic.behavior();
        let declared_inputs = behavior.inputs();
        let declared_outputs = behavior.outputs();

        let mut known: IndexMap<ResourceId, ValueOutcome> = IndexMap::new();
        loop {
            let need: Vec<ResourceId> = behavior
                .resolve_dependencies(self.snapshot, &known)
                .into_iter()
                .filter(|resource| !known.contains_key(resource))
                .collect();
            if need.is_empty() {
                break;
            }
            for resource in need {
                let is_direct = Some(declared_inputs.contains(&resource));
                let (source_type, outcome) = self.resolve_input(path, &resource);
                self.record_input(
                    path,
                    resource.clone(),
                    InputContext {
                        source_type,
                        is_direct,
                    },
                    outcome.clone(),
                );
                known.insert(resource, outcome);
            }
        }

        // Adhoc-substituted outputs bypass compute for their resource.
        let mut remaining: Vec<ResourceId> = Vec::new();
        for resource in &declared_outputs {
            let point = ConnectionPoint::new(path.clone(), resource.clone());
            if let Some(substituted) = self.overrides.outputs().get(&point) {
                self.record_output(
                    path,
                    resource.clone(),
                    OutputValueType::ByAdhoc,
                    substituted.clone(),
                );
            } else {
                remaining.push(resource.clone());
            }
        }
        if remaining.is_empty() {
            return;
        }

        let computed = catch_unwind(AssertUnwindSafe(|| behavior.compute(self.snapshot, &known)));
        match computed {
            Ok(mut produced) => {
                NodeComputed {
                    path: path.as_str(),
                    outputs: produced.len(),
                }
                .log();
                for resource in remaining {
                    // Missing keys mean "not producible with these inputs";
                    // no output entry is recorded for them.
                    if let Some(outcome) = produced.swap_remove(&resource) {
                        self.record_output(
                            path,
                            resource,
                            OutputValueType::ByEvaluation,
                            outcome,
                        );
                    }
                }
            }
            Err(panic) => {
                let detail = panic_detail(panic.as_ref());
                tracing::warn!(path = path.as_str(), detail = %detail, "compute panicked");
                for resource in remaining {
                    self.record_output(
                        path,
                        resource,
                        OutputValueType::ByEvaluation,
                        Outcome::fail(
                            ErrorKind::ComputeFailure,
                            format!("compute of {} panicked: {}", path, detail),
                        ),
                    );
                }
            }
        }
    }
}

fn panic_detail(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

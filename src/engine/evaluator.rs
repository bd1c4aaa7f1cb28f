// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::{IndexMap, IndexSet};

use crate::engine::extract::extract_subgraph;
use crate::engine::resolver::Resolver;
use crate::errors::GraphError;
use crate::model::{
    AdhocOverride, CalculationNode, EvaluationResult, NodePath, ResourceId, Snapshot,
    ValueOutcome,
};
use crate::observability::messages::engine::{EvaluationCompleted, EvaluationStarted};
use crate::observability::messages::StructuredLog;

/// Evaluates read requests against one immutable node tree.
///
/// The engine owns no mutable state between calls; each `evaluate*` call
/// builds a fresh per-call resolver, so two calls with equal arguments
/// produce equal results. Requested resources are deduplicated preserving
/// the caller's insertion order, which makes evaluation and serialization
/// deterministic.
///
/// # Examples
///
/// ```
/// use calcgraph::engine::Engine;
/// use calcgraph::model::{CalculationNode, NodeGroup, Snapshot};
/// use calcgraph::providers::{self, Attribute};
///
/// providers::register_defaults();
///
/// let root = NodeGroup::of("root", [
///     providers::bid_node("BID", "APPLE", "Bloomberg", 99.75),
///     providers::ask_node("ASK", "APPLE", "Bloomberg", 100.25),
///     providers::mid_spread_node("MID", "APPLE", "Bloomberg", "FALCON"),
/// ]).unwrap();
///
/// let engine = Engine::new(CalculationNode::Group(root)).unwrap();
/// let mid = providers::attribute_id(Attribute::MidPrice, "APPLE", "FALCON");
/// let results = engine.evaluate(&Snapshot::unspecified(), &[mid.clone()]);
///
/// assert_eq!(results[&mid].success().unwrap().as_number(), Some(100.0));
/// ```
pub struct Engine {
    root: CalculationNode,
}

impl Engine {
    /// Wrap a node tree, validating the group-level flywire invariant:
    /// every flywire a group hosts must target a point inside that group's
    /// subtree. Endpoint existence is deliberately left to read time, where
    /// a dangling endpoint surfaces as a per-resource conflict.
    pub fn new(root: CalculationNode) -> Result<Self, GraphError> {
        validate_flywire_containment(&root, &NodePath::root())?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &CalculationNode {
        &self.root
    }

    /// Resolve the requested resources and return their outcomes only.
    pub fn evaluate(
        &self,
        snapshot: &Snapshot,
        requested: &[ResourceId],
    ) -> IndexMap<ResourceId, ValueOutcome> {
        let overrides = AdhocOverride::default();
        let mut resolver = Resolver::new(&self.root, snapshot, &overrides);
        let mut results = IndexMap::new();
        for resource in dedupe(requested) {
            let outcome = resolver.resolve_request(&resource);
            results.insert(resource, outcome);
        }
        results
    }

    /// Resolve the requested resources and return the full annotated trace:
    /// per-resource outcomes, the per-node evaluation map, and the extracted
    /// sub-graph that reproduces this evaluation.
    pub fn evaluate_for_result(
        &self,
        snapshot: &Snapshot,
        requested: &[ResourceId],
        overrides: Option<AdhocOverride>,
    ) -> EvaluationResult {
        let requested_path = NodePath::root();
        let active = overrides.clone().unwrap_or_default();

        EvaluationStarted {
            path: requested_path.as_str(),
            requested: requested.len(),
        }
        .log();

        let mut resolver = Resolver::new(&self.root, snapshot, &active);
        let mut results = IndexMap::new();
        for resource in dedupe(requested) {
            let outcome = resolver.resolve_request(&resource);
            results.insert(resource, outcome);
        }

        let node_evaluations = resolver.into_evaluations();
        let graph = extract_subgraph(&self.root, &node_evaluations);

        let result = EvaluationResult {
            snapshot: *snapshot,
            requested_path,
            overrides,
            results,
            node_evaluations,
            graph,
        };

        EvaluationCompleted {
            path: result.requested_path.as_str(),
            succeeded: result.success_count(),
            failed: result.failure_count(),
        }
        .log();

        result
    }
}

fn dedupe(requested: &[ResourceId]) -> IndexSet<ResourceId> {
    requested.iter().cloned().collect()
}

fn validate_flywire_containment(
    node: &CalculationNode,
    path: &NodePath,
) -> Result<(), GraphError> {
    let group = match node.as_group() {
        Some(group) => group,
        None => return Ok(()),
    };
    for flywire in group.flywires() {
        if !flywire.target().node_path.is_within(path) {
            return Err(GraphError::FlywireOutsideGroup {
                group: path.to_string(),
                target: flywire.target().node_path.to_string(),
            });
        }
    }
    for child in group.children() {
        validate_flywire_containment(child, &path.child(child.name()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectionPoint, Flywire, NodeGroup, ResourceId, Scope, ValueKind};

    fn rid(attr: &str) -> ResourceId {
        ResourceId::new("attribute", ValueKind::Number).with_field("attribute", attr)
    }

    #[test]
    fn rejects_flywires_escaping_their_group() {
        // A flywire hosted by /root/inner but targeting /root/other.
        let wire = Flywire::new(
            ConnectionPoint::new(NodePath::parse("/root/inner/a").unwrap(), rid("Ask")),
            ConnectionPoint::new(NodePath::parse("/root/other").unwrap(), rid("Ask")),
        )
        .unwrap();
        let inner = NodeGroup::new("inner", [], [wire], Scope::everything()).unwrap();
        let root = NodeGroup::of("root", [inner.into()]).unwrap();

        let engine = Engine::new(CalculationNode::Group(root));
        assert!(matches!(
            engine,
            Err(GraphError::FlywireOutsideGroup { .. })
        ));
    }

    #[test]
    fn accepts_root_level_flywires_into_subtrees() {
        let wire = Flywire::new(
            ConnectionPoint::new(NodePath::parse("/root/hard").unwrap(), rid("Ask")),
            ConnectionPoint::new(NodePath::parse("/root/calc").unwrap(), rid("Ask")),
        )
        .unwrap();
        let root = NodeGroup::new("root", [], [wire], Scope::everything()).unwrap();
        assert!(Engine::new(CalculationNode::Group(root)).is_ok());
    }
}

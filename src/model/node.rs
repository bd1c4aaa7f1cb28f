// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The node hierarchy: atomic computations and named groups.
//!
//! `CalculationNode` is a closed sum of [`AtomicNode`] (a leaf with declared
//! inputs/outputs and a pure `compute`) and [`NodeGroup`] (a named subtree
//! hosting children, flywires and an export scope). Groups never compute;
//! their inputs and outputs are derived from their children.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::errors::GraphError;
use crate::model::{ExportPoint, Flywire, ResourceId, Scope, Snapshot, ValueOutcome};

/// The compute contract an atomic node implementation satisfies.
///
/// Implementations are deterministic given `(snapshot, inputs)` and free of
/// I/O. `resolve_dependencies` must be monotone: given more known inputs it
/// must not request strictly more, which bounds the evaluator's iteration.
pub trait NodeBehavior: Send + Sync {
    /// Registered serialization tag for this node type.
    fn type_tag(&self) -> &'static str;

    /// Explicit parameter record, sufficient to reconstruct the behavior
    /// through the type registry. Also the basis of structural equality.
    fn params(&self) -> serde_json::Value;

    /// Declared inputs, stable before evaluation.
    fn inputs(&self) -> IndexSet<ResourceId>;

    /// Declared outputs, stable before evaluation. `compute` may return a
    /// subset; missing keys mean "not producible with these inputs".
    fn outputs(&self) -> IndexSet<ResourceId>;

    /// The smallest set of resources still needed to produce any output
    /// given the inputs resolved so far. The default asks for every declared
    /// input not yet known; override to discover dependencies dynamically.
    fn resolve_dependencies(
        &self,
        snapshot: &Snapshot,
        known: &IndexMap<ResourceId, ValueOutcome>,
    ) -> IndexSet<ResourceId> {
        let _ = snapshot;
        self.inputs()
            .into_iter()
            .filter(|resource| !known.contains_key(resource))
            .collect()
    }

    /// Produce output values from resolved inputs. Keys must be a subset of
    /// `outputs()`; a `Failure` value marks that specific output as failed.
    fn compute(
        &self,
        snapshot: &Snapshot,
        inputs: &IndexMap<ResourceId, ValueOutcome>,
    ) -> IndexMap<ResourceId, ValueOutcome>;
}

/// Leaf node: a named instance of a [`NodeBehavior`].
#[derive(Clone)]
pub struct AtomicNode {
    name: String,
    behavior: Arc<dyn NodeBehavior>,
}

impl AtomicNode {
    pub fn new(name: impl Into<String>, behavior: Arc<dyn NodeBehavior>) -> Self {
        Self {
            name: name.into(),
            behavior,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn behavior(&self) -> &Arc<dyn NodeBehavior> {
        &self.behavior
    }

    pub fn type_tag(&self) -> &'static str {
        self.behavior.type_tag()
    }

    pub fn params(&self) -> serde_json::Value {
        self.behavior.params()
    }

    pub fn inputs(&self) -> IndexSet<ResourceId> {
        self.behavior.inputs()
    }

    pub fn outputs(&self) -> IndexSet<ResourceId> {
        self.behavior.outputs()
    }
}

impl fmt::Debug for AtomicNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicNode")
            .field("name", &self.name)
            .field("type", &self.behavior.type_tag())
            .field("params", &self.behavior.params())
            .finish()
    }
}

/// Structural equality: same name, same registered type, same parameters.
impl PartialEq for AtomicNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.behavior.type_tag() == other.behavior.type_tag()
            && self.behavior.params() == other.behavior.params()
    }
}

impl Eq for AtomicNode {}

/// Named internal node: children, flywires and an export scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    name: String,
    children: IndexMap<String, CalculationNode>,
    flywires: Vec<Flywire>,
    exports: Scope<ExportPoint>,
}

impl NodeGroup {
    /// Build a group, rejecting duplicate child names. Flywire containment
    /// within the subtree is validated once the tree is rooted (see
    /// [`Engine::new`](crate::engine::Engine::new)), since endpoint paths are
    /// absolute.
    pub fn new(
        name: impl Into<String>,
        children: impl IntoIterator<Item = CalculationNode>,
        flywires: impl IntoIterator<Item = Flywire>,
        exports: Scope<ExportPoint>,
    ) -> Result<Self, GraphError> {
        let name = name.into();
        let mut by_name = IndexMap::new();
        for child in children {
            let child_name = child.name().to_string();
            if by_name.insert(child_name.clone(), child).is_some() {
                return Err(GraphError::DuplicateChild {
                    group: name,
                    name: child_name,
                });
            }
        }
        Ok(Self {
            name,
            children: by_name,
            flywires: flywires.into_iter().collect(),
            exports,
        })
    }

    /// Group with no flywires and everything exported.
    pub fn of(
        name: impl Into<String>,
        children: impl IntoIterator<Item = CalculationNode>,
    ) -> Result<Self, GraphError> {
        Self::new(name, children, [], Scope::everything())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Child lookup, case-sensitive.
    pub fn child(&self, name: &str) -> Option<&CalculationNode> {
        self.children.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &CalculationNode> {
        self.children.values()
    }

    pub fn flywires(&self) -> &[Flywire] {
        &self.flywires
    }

    pub fn exports(&self) -> &Scope<ExportPoint> {
        &self.exports
    }

    /// Derived outputs: the union of child outputs whose `(childName, rid)`
    /// pair is in scope of `exports`.
    pub fn outputs(&self) -> IndexSet<ResourceId> {
        let mut out = IndexSet::new();
        for (child_name, child) in &self.children {
            for resource in child.outputs() {
                let point = ExportPoint::new(child_name.clone(), resource.clone());
                if self.exports.contains(&point) {
                    out.insert(resource);
                }
            }
        }
        out
    }

    /// Derived inputs: the union of child inputs minus every resource
    /// produced by any child. The subtraction deliberately ignores the
    /// export scope, so an unexported internal producer still satisfies a
    /// sibling's requirement for the purpose of this set.
    pub fn inputs(&self) -> IndexSet<ResourceId> {
        let mut produced = IndexSet::new();
        for child in self.children.values() {
            produced.extend(child.outputs());
        }
        let mut needed = IndexSet::new();
        for child in self.children.values() {
            for resource in child.inputs() {
                if !produced.contains(&resource) {
                    needed.insert(resource);
                }
            }
        }
        needed
    }

    /// Children that produce `resource` and are visible under this group's
    /// export scope, in declaration order.
    pub fn exported_producers(&self, resource: &ResourceId) -> Vec<&CalculationNode> {
        self.children
            .iter()
            .filter(|(child_name, child)| {
                child.outputs().contains(resource)
                    && self.exports.contains(&ExportPoint::new(
                        child_name.to_string(),
                        resource.clone(),
                    ))
            })
            .map(|(_, child)| child)
            .collect()
    }
}

/// Closed node sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalculationNode {
    Atomic(AtomicNode),
    Group(NodeGroup),
}

impl CalculationNode {
    pub fn name(&self) -> &str {
        match self {
            CalculationNode::Atomic(node) => node.name(),
            CalculationNode::Group(group) => group.name(),
        }
    }

    pub fn inputs(&self) -> IndexSet<ResourceId> {
        match self {
            CalculationNode::Atomic(node) => node.inputs(),
            CalculationNode::Group(group) => group.inputs(),
        }
    }

    pub fn outputs(&self) -> IndexSet<ResourceId> {
        match self {
            CalculationNode::Atomic(node) => node.outputs(),
            CalculationNode::Group(group) => group.outputs(),
        }
    }

    pub fn as_group(&self) -> Option<&NodeGroup> {
        match self {
            CalculationNode::Group(group) => Some(group),
            CalculationNode::Atomic(_) => None,
        }
    }

    pub fn as_atomic(&self) -> Option<&AtomicNode> {
        match self {
            CalculationNode::Atomic(node) => Some(node),
            CalculationNode::Group(_) => None,
        }
    }

    /// Walk the tree by path segments below the root.
    pub fn descend<'a>(&'a self, path: &crate::model::NodePath) -> Option<&'a CalculationNode> {
        let mut current = self;
        for segment in path.segments_below_root() {
            current = current.as_group()?.child(segment)?;
        }
        Some(current)
    }
}

impl From<AtomicNode> for CalculationNode {
    fn from(node: AtomicNode) -> Self {
        CalculationNode::Atomic(node)
    }
}

impl From<NodeGroup> for CalculationNode {
    fn from(group: NodeGroup) -> Self {
        CalculationNode::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Value, ValueKind};
    use serde_json::json;

    struct FixedOutput {
        resource: ResourceId,
        value: f64,
    }

    impl NodeBehavior for FixedOutput {
        fn type_tag(&self) -> &'static str {
            "fixed_output"
        }

        fn params(&self) -> serde_json::Value {
            json!({ "value": self.value })
        }

        fn inputs(&self) -> IndexSet<ResourceId> {
            IndexSet::new()
        }

        fn outputs(&self) -> IndexSet<ResourceId> {
            IndexSet::from([self.resource.clone()])
        }

        fn compute(
            &self,
            _snapshot: &Snapshot,
            _inputs: &IndexMap<ResourceId, ValueOutcome>,
        ) -> IndexMap<ResourceId, ValueOutcome> {
            IndexMap::from([(
                self.resource.clone(),
                crate::model::Outcome::Success(Value::Number(self.value)),
            )])
        }
    }

    struct Consumer {
        needs: ResourceId,
        makes: ResourceId,
    }

    impl NodeBehavior for Consumer {
        fn type_tag(&self) -> &'static str {
            "consumer"
        }

        fn params(&self) -> serde_json::Value {
            json!({})
        }

        fn inputs(&self) -> IndexSet<ResourceId> {
            IndexSet::from([self.needs.clone()])
        }

        fn outputs(&self) -> IndexSet<ResourceId> {
            IndexSet::from([self.makes.clone()])
        }

        fn compute(
            &self,
            _snapshot: &Snapshot,
            inputs: &IndexMap<ResourceId, ValueOutcome>,
        ) -> IndexMap<ResourceId, ValueOutcome> {
            IndexMap::from([(
                self.makes.clone(),
                inputs
                    .get(&self.needs)
                    .cloned()
                    .unwrap_or_else(|| {
                        crate::model::Outcome::fail(
                            crate::errors::ErrorKind::UnresolvedInput,
                            "missing input",
                        )
                    }),
            )])
        }
    }

    fn rid(name: &str) -> ResourceId {
        ResourceId::new("attribute", ValueKind::Number).with_field("attribute", name)
    }

    fn atomic(name: &str, behavior: impl NodeBehavior + 'static) -> CalculationNode {
        CalculationNode::Atomic(AtomicNode::new(name, Arc::new(behavior)))
    }

    fn sample_group(exports: Scope<ExportPoint>) -> NodeGroup {
        NodeGroup::new(
            "g",
            [
                atomic(
                    "maker",
                    FixedOutput {
                        resource: rid("Bid"),
                        value: 1.0,
                    },
                ),
                atomic(
                    "user",
                    Consumer {
                        needs: rid("Bid"),
                        makes: rid("MidPrice"),
                    },
                ),
            ],
            [],
            exports,
        )
        .unwrap()
    }

    #[test]
    fn duplicate_child_names_are_rejected() {
        let result = NodeGroup::of(
            "g",
            [
                atomic("n", FixedOutput { resource: rid("Bid"), value: 1.0 }),
                atomic("n", FixedOutput { resource: rid("Ask"), value: 2.0 }),
            ],
        );
        assert!(matches!(result, Err(GraphError::DuplicateChild { .. })));
    }

    #[test]
    fn outputs_respect_export_scope() {
        let open = sample_group(Scope::everything());
        assert!(open.outputs().contains(&rid("Bid")));
        assert!(open.outputs().contains(&rid("MidPrice")));

        let closed = sample_group(Scope::exclude([ExportPoint::new("maker", rid("Bid"))]));
        assert!(!closed.outputs().contains(&rid("Bid")));
        assert!(closed.outputs().contains(&rid("MidPrice")));
    }

    #[test]
    fn inputs_subtract_internally_produced_resources() {
        // "Bid" is produced by `maker`, so the group needs nothing from
        // outside, even when the producer is not exported.
        let closed = sample_group(Scope::exclude([ExportPoint::new("maker", rid("Bid"))]));
        assert!(closed.inputs().is_empty());
    }

    #[test]
    fn exported_producers_are_scope_filtered() {
        let open = sample_group(Scope::everything());
        assert_eq!(open.exported_producers(&rid("Bid")).len(), 1);

        let closed = sample_group(Scope::exclude([ExportPoint::new("maker", rid("Bid"))]));
        assert!(closed.exported_producers(&rid("Bid")).is_empty());
    }

    #[test]
    fn descend_walks_nested_groups() {
        let inner = NodeGroup::of(
            "inner",
            [atomic("leaf", FixedOutput { resource: rid("Bid"), value: 1.0 })],
        )
        .unwrap();
        let root = CalculationNode::Group(NodeGroup::of("root", [inner.into()]).unwrap());

        let path = crate::model::NodePath::parse("/root/inner/leaf").unwrap();
        let found = root.descend(&path).expect("leaf should resolve");
        assert_eq!(found.name(), "leaf");

        let missing = crate::model::NodePath::parse("/root/inner/ghost").unwrap();
        assert!(root.descend(&missing).is_none());
    }

    #[test]
    fn atomic_equality_is_structural() {
        let a = AtomicNode::new("n", Arc::new(FixedOutput { resource: rid("Bid"), value: 1.0 }));
        let b = AtomicNode::new("n", Arc::new(FixedOutput { resource: rid("Bid"), value: 1.0 }));
        let c = AtomicNode::new("n", Arc::new(FixedOutput { resource: rid("Bid"), value: 2.0 }));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Mutable mirror of a node tree for interactive editing.
//!
//! A [`GroupBuilder`] is the only mutable counterpart of the immutable node
//! model: canvases and tools edit the builder, then commit with
//! [`GroupBuilder::to_node`], which reconstructs an immutable [`NodeGroup`].
//! `from_node` followed by `to_node` round-trips structurally.
//!
//! All paths handed to builder operations are absolute; the leading `/root`
//! segment addresses this builder's own group.

use indexmap::IndexMap;

use crate::errors::GraphError;
use crate::model::{
    AtomicNode, CalculationNode, ExportPoint, Flywire, NodeGroup, NodePath, Scope,
};

#[derive(Debug, Clone)]
enum ChildSlot {
    Atomic(AtomicNode),
    Group(GroupBuilder),
}

/// Mutable editing surface over one group subtree.
#[derive(Debug, Clone)]
pub struct GroupBuilder {
    name: String,
    children: IndexMap<String, ChildSlot>,
    flywires: Vec<Flywire>,
    exports: Scope<ExportPoint>,
}

impl GroupBuilder {
    /// Fresh empty group exporting everything.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: IndexMap::new(),
            flywires: Vec::new(),
            exports: Scope::everything(),
        }
    }

    /// Mirror an existing immutable group.
    pub fn from_node(group: &NodeGroup) -> Self {
        let mut children = IndexMap::new();
        for child in group.children() {
            let slot = match child {
                CalculationNode::Atomic(node) => ChildSlot::Atomic(node.clone()),
                CalculationNode::Group(inner) => ChildSlot::Group(GroupBuilder::from_node(inner)),
            };
            children.insert(child.name().to_string(), slot);
        }
        Self {
            name: group.name().to_string(),
            children,
            flywires: group.flywires().to_vec(),
            exports: group.exports().clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a node as a child of the group at `parent`. Fails when the name
    /// is already taken or the path does not address a group.
    pub fn add_node(
        &mut self,
        parent: &NodePath,
        node: CalculationNode,
    ) -> Result<(), GraphError> {
        let group = self.group_mut(parent)?;
        let name = node.name().to_string();
        if group.children.contains_key(&name) {
            return Err(GraphError::DuplicateChild {
                group: parent.to_string(),
                name,
            });
        }
        let slot = match node {
            CalculationNode::Atomic(atomic) => ChildSlot::Atomic(atomic),
            CalculationNode::Group(inner) => ChildSlot::Group(GroupBuilder::from_node(&inner)),
        };
        group.children.insert(name, slot);
        Ok(())
    }

    /// Remove the node at `path` from its parent group.
    pub fn delete_node(&mut self, path: &NodePath) -> Result<(), GraphError> {
        let parent = path
            .parent()
            .ok_or_else(|| GraphError::InvalidPath(path.to_string()))?;
        let group = self.group_mut(&parent)?;
        match group.children.shift_remove(path.leaf()) {
            Some(_) => Ok(()),
            None => Err(GraphError::NoSuchNode(path.to_string())),
        }
    }

    /// Host a flywire on the group at `at`.
    pub fn add_flywire(&mut self, at: &NodePath, flywire: Flywire) -> Result<(), GraphError> {
        self.group_mut(at)?.flywires.push(flywire);
        Ok(())
    }

    /// Remove a previously added flywire from the group at `at`. Returns
    /// whether a wire was actually removed.
    pub fn delete_flywire(&mut self, at: &NodePath, flywire: &Flywire) -> Result<bool, GraphError> {
        let group = self.group_mut(at)?;
        let before = group.flywires.len();
        group.flywires.retain(|existing| existing != flywire);
        Ok(group.flywires.len() < before)
    }

    /// Replace the export scope of the group at `at`.
    pub fn set_exports(
        &mut self,
        at: &NodePath,
        exports: Scope<ExportPoint>,
    ) -> Result<(), GraphError> {
        self.group_mut(at)?.exports = exports;
        Ok(())
    }

    /// Commit the current state to an immutable group.
    pub fn to_node(&self) -> Result<NodeGroup, GraphError> {
        let children: Vec<CalculationNode> = self
            .children
            .values()
            .map(|slot| match slot {
                ChildSlot::Atomic(node) => Ok(CalculationNode::Atomic(node.clone())),
                ChildSlot::Group(builder) => builder.to_node().map(CalculationNode::Group),
            })
            .collect::<Result<_, GraphError>>()?;
        NodeGroup::new(
            self.name.clone(),
            children,
            self.flywires.iter().cloned(),
            self.exports.clone(),
        )
    }

    fn group_mut(&mut self, path: &NodePath) -> Result<&mut GroupBuilder, GraphError> {
        let mut current = self;
        for segment in path.segments_below_root().collect::<Vec<_>>() {
            let next = current
                .children
                .get_mut(segment)
                .ok_or_else(|| GraphError::NoSuchNode(path.to_string()))?;
            current = match next {
                ChildSlot::Group(builder) => builder,
                ChildSlot::Atomic(_) => {
                    return Err(GraphError::NotAGroup(path.to_string()));
                }
            };
        }
        Ok(current)
    }
}

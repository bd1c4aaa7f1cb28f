// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sub-graph extraction: the minimal tree that reproduces an evaluation.
//!
//! The extracted graph contains exactly the atomic nodes that were evaluated
//! at least once, every enclosing group needed to address them by their
//! original paths, the flywires whose endpoints both survive, and each
//! group's export scope restricted to surviving children.

use indexmap::IndexMap;

use crate::model::{CalculationNode, NodeEvaluation, NodeGroup, NodePath};

/// Build the minimal reproduction graph for a completed evaluation.
///
/// Two passes: first keep evaluated atomics and the groups addressing them,
/// then re-attach every flywire whose absolute endpoints both survive. The
/// root group itself always survives (possibly empty) so the result stays
/// addressable at `/root` even when nothing was evaluated.
pub fn extract_subgraph(
    root: &CalculationNode,
    evaluations: &IndexMap<NodePath, NodeEvaluation>,
) -> CalculationNode {
    let skeleton = match retain(root, &NodePath::root(), evaluations) {
        Some(kept) => kept,
        None => root.clone(),
    };
    let whole = skeleton.clone();
    attach_flywires(root, skeleton, &whole)
}

fn retain(
    node: &CalculationNode,
    path: &NodePath,
    evaluations: &IndexMap<NodePath, NodeEvaluation>,
) -> Option<CalculationNode> {
    match node {
        CalculationNode::Atomic(_) => {
            if evaluations.contains_key(path) {
                Some(node.clone())
            } else {
                None
            }
        }
        CalculationNode::Group(group) => {
            let mut kept_children = Vec::new();
            for child in group.children() {
                if let Some(kept) = retain(child, &path.child(child.name()), evaluations) {
                    kept_children.push(kept);
                }
            }
            if kept_children.is_empty() && !path.is_root() {
                return None;
            }

            let kept_names: Vec<String> = kept_children
                .iter()
                .map(|child| child.name().to_string())
                .collect();
            let mut exports = group.exports().clone();
            exports.retain(|point| kept_names.iter().any(|name| *name == point.child));

            let skeleton = NodeGroup::new(group.name(), kept_children, [], exports)
                .expect("kept children cannot introduce duplicate names");
            Some(CalculationNode::Group(skeleton))
        }
    }
}

/// Re-attach the original flywires whose endpoints both exist in the kept
/// tree. Endpoint paths are absolute, so the check runs against the whole
/// extracted tree rather than the hosting group alone.
fn attach_flywires(
    original: &CalculationNode,
    kept: CalculationNode,
    whole: &CalculationNode,
) -> CalculationNode {
    let (original_group, kept_group) = match (original, kept) {
        (CalculationNode::Group(og), CalculationNode::Group(kg)) => (og, kg),
        (_, other) => return other,
    };

    let children: Vec<CalculationNode> = kept_group
        .children()
        .map(|child| match original_group.child(child.name()) {
            Some(original_child) => attach_flywires(original_child, child.clone(), whole),
            None => child.clone(),
        })
        .collect();

    let flywires: Vec<_> = original_group
        .flywires()
        .iter()
        .filter(|flywire| {
            whole.descend(&flywire.source().node_path).is_some()
                && whole.descend(&flywire.target().node_path).is_some()
        })
        .cloned()
        .collect();

    let rebuilt = NodeGroup::new(
        kept_group.name(),
        children,
        flywires,
        kept_group.exports().clone(),
    )
    .expect("rebuilding a kept group cannot introduce duplicate names");

    CalculationNode::Group(rebuilt)
}

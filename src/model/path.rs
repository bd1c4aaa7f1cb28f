// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::errors::GraphError;

const ROOT_SEGMENT: &str = "root";

/// Normalized absolute address of one node in the calculation tree.
///
/// Paths follow POSIX conventions with forward slashes: `/root` is the tree
/// root, `/root/G/n` names node `n` inside group `G`. The leading `root`
/// segment is positional: it addresses the root node, whatever that node is
/// named. Paths are compared by their normalized string form.
///
/// # Examples
///
/// ```
/// use calcgraph::model::NodePath;
///
/// let calc = NodePath::root().child("calc");
/// assert_eq!(calc.as_str(), "/root/calc");
/// assert_eq!(calc.parent(), Some(NodePath::root()));
///
/// let sibling = calc.resolve("../raw/BID").unwrap();
/// assert_eq!(sibling.as_str(), "/root/raw/BID");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(String);

impl NodePath {
    /// The tree root, `/root`.
    pub fn root() -> Self {
        NodePath(format!("/{}", ROOT_SEGMENT))
    }

    /// Parse an absolute path. Normalizes `.` and `..` segments and
    /// collapses repeated slashes; rejects paths that do not start at
    /// `/root` or that escape above it.
    pub fn parse(raw: &str) -> Result<Self, GraphError> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('/') {
            return Err(GraphError::InvalidPath(raw.to_string()));
        }
        let segments = normalize(trimmed.split('/'), &[], raw)?;
        if segments.first().map(String::as_str) != Some(ROOT_SEGMENT) {
            return Err(GraphError::InvalidPath(raw.to_string()));
        }
        Ok(NodePath(join(&segments)))
    }

    /// Resolve `raw` against this path. Absolute inputs are parsed on their
    /// own; relative inputs are appended and normalized per POSIX rules.
    pub fn resolve(&self, raw: &str) -> Result<NodePath, GraphError> {
        let trimmed = raw.trim();
        if trimmed.starts_with('/') {
            return NodePath::parse(trimmed);
        }
        let base: Vec<String> = self.segments().map(str::to_string).collect();
        let segments = normalize(trimmed.split('/'), &base, raw)?;
        if segments.first().map(String::as_str) != Some(ROOT_SEGMENT) {
            return Err(GraphError::PathEscapesRoot(raw.to_string()));
        }
        Ok(NodePath(join(&segments)))
    }

    /// Append one child segment.
    pub fn child(&self, name: &str) -> NodePath {
        NodePath(format!("{}/{}", self.0, name))
    }

    /// The containing path, or `None` for the root.
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        let cut = self.0.rfind('/').unwrap_or(0);
        Some(NodePath(self.0[..cut].to_string()))
    }

    /// Final segment of the path.
    pub fn leaf(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(ROOT_SEGMENT)
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == ROOT_SEGMENT.len() + 1
    }

    /// Whether `self` equals `other` or lies inside its subtree.
    pub fn is_within(&self, other: &NodePath) -> bool {
        self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0.as_bytes().get(other.0.len()) == Some(&b'/'))
    }

    /// All segments including the leading `root`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Segments below the root, in order.
    pub fn segments_below_root(&self) -> impl Iterator<Item = &str> {
        self.segments().skip(1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize<'a>(
    raw_segments: impl Iterator<Item = &'a str>,
    base: &[String],
    original: &str,
) -> Result<Vec<String>, GraphError> {
    let mut segments: Vec<String> = base.to_vec();
    for segment in raw_segments {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.pop().is_none() {
                    return Err(GraphError::PathEscapesRoot(original.to_string()));
                }
            }
            name => segments.push(name.to_string()),
        }
    }
    if segments.is_empty() {
        return Err(GraphError::PathEscapesRoot(original.to_string()));
    }
    Ok(segments)
}

fn join(segments: &[String]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}

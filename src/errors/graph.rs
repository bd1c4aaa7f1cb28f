// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Construction-time errors for paths, groups, flywires and builders.
//!
//! These are the only errors raised eagerly; everything that can go wrong
//! during resolution is surfaced per-resource as an
//! [`ErrorInfo`](crate::errors::ErrorInfo) instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The string is not a valid absolute node path.
    #[error("invalid node path '{0}'")]
    InvalidPath(String),

    /// Relative path arithmetic walked above `/root`.
    #[error("path '{0}' escapes the root")]
    PathEscapesRoot(String),

    /// Two children of one group share a name.
    #[error("duplicate child name '{name}' in group '{group}'")]
    DuplicateChild { group: String, name: String },

    /// A path does not address any node in the tree.
    #[error("no node at path '{0}'")]
    NoSuchNode(String),

    /// A path addresses an atomic node where a group was required.
    #[error("node at '{0}' is not a group")]
    NotAGroup(String),

    /// A group hosts a flywire whose target lies outside its own subtree.
    #[error("flywire target '{target}' lies outside the subtree of group '{group}'")]
    FlywireOutsideGroup { group: String, target: String },

    /// Flywire endpoints with incompatible carried types.
    #[error("incompatible flywire: source '{source_path}' cannot feed target '{target}'")]
    IncompatibleFlywire { source_path: String, target: String },
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process-wide tag-to-constructor registry.
//!
//! Atomic node types and resource identifier types are reconstructed from
//! the wire through explicit constructors keyed by their type tag. The
//! lifecycle is `register at startup -> freeze -> read-only`: registration
//! after [`freeze`] fails, and unknown tags on read yield
//! [`WireError::UnknownType`]. No runtime field scraping takes place;
//! every constructor receives the explicit parameter record it serialized.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::sync::RwLock;

use crate::errors::WireError;
use crate::model::{AtomicNode, ResourceId};

/// Builds an atomic node from its wire parameter record (including `name`).
pub type NodeConstructor = fn(&serde_json::Value) -> Result<AtomicNode, WireError>;

/// Builds a resource identifier from its wire `data` record.
pub type ResourceConstructor = fn(&serde_json::Value) -> Result<ResourceId, WireError>;

struct TypeRegistry {
    nodes: IndexMap<String, NodeConstructor>,
    resources: IndexMap<String, ResourceConstructor>,
    frozen: bool,
}

static REGISTRY: Lazy<RwLock<TypeRegistry>> = Lazy::new(|| {
    RwLock::new(TypeRegistry {
        nodes: IndexMap::new(),
        resources: IndexMap::new(),
        frozen: false,
    })
});

/// Register a node constructor under `tag`. Re-registering the same tag
/// before the freeze replaces the previous constructor, so startup
/// registration stays idempotent.
pub fn register_node_type(tag: &str, constructor: NodeConstructor) -> Result<(), WireError> {
    let mut registry = REGISTRY.write().expect("type registry poisoned");
    if registry.frozen {
        return Err(WireError::RegistryFrozen(tag.to_string()));
    }
    registry.nodes.insert(tag.to_string(), constructor);
    Ok(())
}

/// Register a resource identifier constructor under `tag`.
pub fn register_resource_type(
    tag: &str,
    constructor: ResourceConstructor,
) -> Result<(), WireError> {
    let mut registry = REGISTRY.write().expect("type registry poisoned");
    if registry.frozen {
        return Err(WireError::RegistryFrozen(tag.to_string()));
    }
    registry.resources.insert(tag.to_string(), constructor);
    Ok(())
}

/// End the registration phase; all later registrations fail.
pub fn freeze() {
    REGISTRY.write().expect("type registry poisoned").frozen = true;
}

/// Construct an atomic node from its tag and parameter record.
pub fn construct_node(tag: &str, record: &serde_json::Value) -> Result<AtomicNode, WireError> {
    let registry = REGISTRY.read().expect("type registry poisoned");
    match registry.nodes.get(tag) {
        Some(constructor) => constructor(record),
        None => Err(WireError::UnknownType(tag.to_string())),
    }
}

/// Construct a resource identifier from its tag and data record.
pub fn construct_resource(tag: &str, data: &serde_json::Value) -> Result<ResourceId, WireError> {
    let registry = REGISTRY.read().expect("type registry poisoned");
    match registry.resources.get(tag) {
        Some(constructor) => constructor(data),
        None => Err(WireError::UnknownType(tag.to_string())),
    }
}

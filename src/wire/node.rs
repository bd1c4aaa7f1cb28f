// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Canonical wire form for node trees.
//!
//! Every node is a self-describing object `{ "type": <tag>, ... }`. Groups
//! carry their definition under `"parameter"`; atomic nodes carry one
//! `"parameters"` array, where consecutive children of the same registered
//! tag are batched into a single entry. Resource identifiers travel as
//! `{ "type": <tag>, "data": {...} }` and are rebuilt through the type
//! registry.

use serde_json::{json, Map, Value as Json};

use crate::errors::WireError;
use crate::model::{
    CalculationNode, ConnectionPoint, ExportPoint, Flywire, NodeGroup, NodePath, ResourceId,
    Scope,
};
use crate::wire::registry;

pub(crate) const GROUP_TAG: &str = "NodeGroup";

/// Serialize a node tree to its canonical JSON string.
pub fn node_to_json(node: &CalculationNode) -> Result<String, WireError> {
    Ok(serde_json::to_string_pretty(&node_to_value(node))?)
}

/// Parse a node tree from its canonical JSON string.
pub fn node_from_json(text: &str) -> Result<CalculationNode, WireError> {
    let value: Json = serde_json::from_str(text)?;
    node_from_value(&value)
}

pub(crate) fn node_to_value(node: &CalculationNode) -> Json {
    match node {
        CalculationNode::Group(group) => group_to_value(group),
        CalculationNode::Atomic(atomic) => json!({
            "type": atomic.type_tag(),
            "parameters": [atomic_record(atomic)],
        }),
    }
}

fn group_to_value(group: &NodeGroup) -> Json {
    // Batch consecutive same-tag atomic children into one entry.
    let mut nodes: Vec<Json> = Vec::new();
    let mut open_batch: Option<(&'static str, Vec<Json>)> = None;

    for child in group.children() {
        match child {
            CalculationNode::Atomic(atomic) => {
                let continues = matches!(&open_batch, Some((tag, _)) if *tag == atomic.type_tag());
                if continues {
                    if let Some((_, records)) = open_batch.as_mut() {
                        records.push(atomic_record(atomic));
                    }
                } else {
                    flush_batch(&mut nodes, open_batch.take());
                    open_batch = Some((atomic.type_tag(), vec![atomic_record(atomic)]));
                }
            }
            CalculationNode::Group(inner) => {
                flush_batch(&mut nodes, open_batch.take());
                nodes.push(group_to_value(inner));
            }
        }
    }
    flush_batch(&mut nodes, open_batch.take());

    let flywires: Vec<Json> = group.flywires().iter().map(flywire_to_value).collect();

    json!({
        "type": GROUP_TAG,
        "parameter": {
            "name": group.name(),
            "nodes": nodes,
            "flywires": flywires,
            "exports": exports_to_value(group.exports()),
        },
    })
}

fn flush_batch(nodes: &mut Vec<Json>, batch: Option<(&'static str, Vec<Json>)>) {
    if let Some((tag, records)) = batch {
        nodes.push(json!({ "type": tag, "parameters": records }));
    }
}

fn atomic_record(atomic: &crate::model::AtomicNode) -> Json {
    let mut record = match atomic.params() {
        Json::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("params".to_string(), other);
            map
        }
    };
    record.insert("name".to_string(), Json::String(atomic.name().to_string()));
    Json::Object(record)
}

pub(crate) fn node_from_value(value: &Json) -> Result<CalculationNode, WireError> {
    let tag = field_str(value, "node", "type")?;
    if tag == GROUP_TAG {
        return Ok(CalculationNode::Group(group_from_value(value)?));
    }
    let records = value
        .get("parameters")
        .and_then(Json::as_array)
        .ok_or_else(|| WireError::missing_field("atomic node", "parameters"))?;
    match records.as_slice() {
        [record] => Ok(CalculationNode::Atomic(registry::construct_node(tag, record)?)),
        _ => Err(WireError::malformed(
            "atomic node",
            "a standalone atomic entry must carry exactly one parameter record",
        )),
    }
}

fn group_from_value(value: &Json) -> Result<NodeGroup, WireError> {
    let parameter = value
        .get("parameter")
        .ok_or_else(|| WireError::missing_field("NodeGroup", "parameter"))?;
    let name = field_str(parameter, "NodeGroup.parameter", "name")?;

    let mut children: Vec<CalculationNode> = Vec::new();
    let entries = parameter
        .get("nodes")
        .and_then(Json::as_array)
        .ok_or_else(|| WireError::missing_field("NodeGroup.parameter", "nodes"))?;
    for entry in entries {
        let tag = field_str(entry, "node", "type")?;
        if tag == GROUP_TAG {
            children.push(CalculationNode::Group(group_from_value(entry)?));
            continue;
        }
        let records = entry
            .get("parameters")
            .and_then(Json::as_array)
            .ok_or_else(|| WireError::missing_field("atomic node", "parameters"))?;
        for record in records {
            children.push(CalculationNode::Atomic(registry::construct_node(tag, record)?));
        }
    }

    let mut flywires: Vec<Flywire> = Vec::new();
    let wires = parameter
        .get("flywires")
        .and_then(Json::as_array)
        .ok_or_else(|| WireError::missing_field("NodeGroup.parameter", "flywires"))?;
    for wire in wires {
        flywires.push(flywire_from_value(wire)?);
    }

    let exports = exports_from_value(
        parameter
            .get("exports")
            .ok_or_else(|| WireError::missing_field("NodeGroup.parameter", "exports"))?,
    )?;

    Ok(NodeGroup::new(name, children, flywires, exports)?)
}

pub(crate) fn resource_to_value(resource: &ResourceId) -> Json {
    let mut data = Map::new();
    for (key, value) in resource.data() {
        data.insert(key.clone(), Json::String(value.clone()));
    }
    json!({ "type": resource.tag(), "data": data })
}

pub(crate) fn resource_from_value(value: &Json) -> Result<ResourceId, WireError> {
    let tag = field_str(value, "resource identifier", "type")?;
    let data = value
        .get("data")
        .ok_or_else(|| WireError::missing_field("resource identifier", "data"))?;
    registry::construct_resource(tag, data)
}

pub(crate) fn connection_point_to_value(point: &ConnectionPoint) -> Json {
    json!({
        "nodePath": point.node_path.as_str(),
        "resourceId": resource_to_value(&point.resource),
    })
}

pub(crate) fn connection_point_from_value(value: &Json) -> Result<ConnectionPoint, WireError> {
    let raw_path = field_str(value, "connection point", "nodePath")?;
    let node_path = NodePath::parse(raw_path)?;
    let resource = resource_from_value(
        value
            .get("resourceId")
            .ok_or_else(|| WireError::missing_field("connection point", "resourceId"))?,
    )?;
    Ok(ConnectionPoint::new(node_path, resource))
}

pub(crate) fn flywire_to_value(flywire: &Flywire) -> Json {
    json!({
        "source": connection_point_to_value(flywire.source()),
        "target": connection_point_to_value(flywire.target()),
    })
}

pub(crate) fn flywire_from_value(value: &Json) -> Result<Flywire, WireError> {
    let source = connection_point_from_value(
        value
            .get("source")
            .ok_or_else(|| WireError::missing_field("flywire", "source"))?,
    )?;
    let target = connection_point_from_value(
        value
            .get("target")
            .ok_or_else(|| WireError::missing_field("flywire", "target"))?,
    )?;
    Ok(Flywire::new(source, target)?)
}

/// Export scope entries reuse the connection point shape; the child name
/// travels in `nodePath`.
fn exports_to_value(exports: &Scope<ExportPoint>) -> Json {
    let (variant, values) = match exports {
        Scope::Include(set) => ("Include", set),
        Scope::Exclude(set) => ("Exclude", set),
    };
    let entries: Vec<Json> = values
        .iter()
        .map(|point| {
            json!({
                "nodePath": point.child,
                "resourceId": resource_to_value(&point.resource),
            })
        })
        .collect();
    json!({ "type": variant, "values": entries })
}

fn exports_from_value(value: &Json) -> Result<Scope<ExportPoint>, WireError> {
    let variant = field_str(value, "exports", "type")?;
    let entries = value
        .get("values")
        .and_then(Json::as_array)
        .ok_or_else(|| WireError::missing_field("exports", "values"))?;
    let mut points = Vec::new();
    for entry in entries {
        let child = field_str(entry, "export point", "nodePath")?;
        let resource = resource_from_value(
            entry
                .get("resourceId")
                .ok_or_else(|| WireError::missing_field("export point", "resourceId"))?,
        )?;
        points.push(ExportPoint::new(child, resource));
    }
    match variant {
        "Include" => Ok(Scope::include(points)),
        "Exclude" => Ok(Scope::exclude(points)),
        other => Err(WireError::malformed(
            "exports",
            format!("unknown scope variant '{}'", other),
        )),
    }
}

pub(crate) fn field_str<'v>(
    value: &'v Json,
    context: &str,
    field: &str,
) -> Result<&'v str, WireError> {
    value
        .get(field)
        .and_then(Json::as_str)
        .ok_or_else(|| WireError::missing_field(context, field))
}

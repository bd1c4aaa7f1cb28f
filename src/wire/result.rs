// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Canonical wire form for evaluation results.
//!
//! Maps keyed by resource identifiers or node paths serialize as entry
//! lists `[{ "key": ..., "value": ... }]` so the wire stays self-describing
//! and key order survives the round trip.

use chrono::{DateTime, Utc};
use serde_json::{json, Value as Json};

use crate::errors::{ErrorInfo, WireError};
use crate::model::{
    AdhocOverride, EvaluationResult, InputContext, InputResult, InputSourceType, NodeEvaluation,
    NodePath, Outcome, OutputContext, OutputResult, OutputValueType, Snapshot, Value,
    ValueOutcome,
};
use crate::wire::node::{
    connection_point_from_value, connection_point_to_value, flywire_from_value, flywire_to_value,
    node_from_value, node_to_value, resource_from_value, resource_to_value,
};

/// Serialize an evaluation result to its canonical JSON string.
pub fn result_to_json(result: &EvaluationResult) -> Result<String, WireError> {
    Ok(serde_json::to_string_pretty(&result_to_value(result))?)
}

/// Parse an evaluation result from its canonical JSON string.
pub fn result_from_json(text: &str) -> Result<EvaluationResult, WireError> {
    let value: Json = serde_json::from_str(text)?;
    result_from_value(&value)
}

fn result_to_value(result: &EvaluationResult) -> Json {
    let results: Vec<Json> = result
        .results
        .iter()
        .map(|(resource, outcome)| {
            json!({
                "key": resource_to_value(resource),
                "value": outcome_to_value(outcome),
            })
        })
        .collect();

    let node_evaluations: Vec<Json> = result
        .node_evaluations
        .iter()
        .map(|(path, evaluation)| {
            json!({
                "key": path.as_str(),
                "value": evaluation_to_value(evaluation),
            })
        })
        .collect();

    json!({
        "snapshot": snapshot_to_value(&result.snapshot),
        "requestedNodePath": result.requested_path.as_str(),
        "adhocOverride": match &result.overrides {
            Some(overrides) => override_to_value(overrides),
            None => Json::Null,
        },
        "results": results,
        "nodeEvaluationMap": node_evaluations,
        "graph": node_to_value(&result.graph),
    })
}

fn result_from_value(value: &Json) -> Result<EvaluationResult, WireError> {
    let snapshot = snapshot_from_value(
        value
            .get("snapshot")
            .ok_or_else(|| WireError::missing_field("evaluation result", "snapshot"))?,
    )?;
    let requested_path = NodePath::parse(crate::wire::node::field_str(
        value,
        "evaluation result",
        "requestedNodePath",
    )?)?;

    let overrides = match value.get("adhocOverride") {
        None | Some(Json::Null) => None,
        Some(raw) => Some(override_from_value(raw)?),
    };

    let mut results = indexmap::IndexMap::new();
    for entry in entry_list(value, "evaluation result", "results")? {
        let resource = resource_from_value(entry_key(entry)?)?;
        let outcome = outcome_from_value(entry_value(entry)?)?;
        results.insert(resource, outcome);
    }

    let mut node_evaluations = indexmap::IndexMap::new();
    for entry in entry_list(value, "evaluation result", "nodeEvaluationMap")? {
        let path = NodePath::parse(entry_key(entry)?.as_str().ok_or_else(|| {
            WireError::malformed("nodeEvaluationMap", "key must be a path string")
        })?)?;
        let evaluation = evaluation_from_value(entry_value(entry)?)?;
        node_evaluations.insert(path, evaluation);
    }

    let graph = node_from_value(
        value
            .get("graph")
            .ok_or_else(|| WireError::missing_field("evaluation result", "graph"))?,
    )?;

    Ok(EvaluationResult {
        snapshot,
        requested_path,
        overrides,
        results,
        node_evaluations,
        graph,
    })
}

pub(crate) fn outcome_to_value(outcome: &ValueOutcome) -> Json {
    match outcome {
        Outcome::Success(value) => json!({
            "type": "Success",
            "data": serde_json::to_value(value).expect("value serialization is infallible"),
        }),
        Outcome::Failure(info) => json!({
            "type": "Failure",
            "error": serde_json::to_value(info).expect("error serialization is infallible"),
        }),
    }
}

pub(crate) fn outcome_from_value(value: &Json) -> Result<ValueOutcome, WireError> {
    let variant = crate::wire::node::field_str(value, "result", "type")?;
    match variant {
        "Success" => {
            let data = value
                .get("data")
                .ok_or_else(|| WireError::missing_field("result", "data"))?;
            let parsed: Value = serde_json::from_value(data.clone())?;
            Ok(Outcome::Success(parsed))
        }
        "Failure" => {
            let error = value
                .get("error")
                .ok_or_else(|| WireError::missing_field("result", "error"))?;
            let parsed: ErrorInfo = serde_json::from_value(error.clone())?;
            Ok(Outcome::Failure(parsed))
        }
        other => Err(WireError::malformed(
            "result",
            format!("unknown result variant '{}'", other),
        )),
    }
}

fn snapshot_to_value(snapshot: &Snapshot) -> Json {
    let timestamp = |ts: &Option<DateTime<Utc>>| match ts {
        Some(instant) => Json::String(instant.to_rfc3339()),
        None => Json::Null,
    };
    json!({
        "logicalTimestamp": timestamp(&snapshot.logical),
        "physicalTimestamp": timestamp(&snapshot.physical),
    })
}

fn snapshot_from_value(value: &Json) -> Result<Snapshot, WireError> {
    let timestamp = |field: &str| -> Result<Option<DateTime<Utc>>, WireError> {
        match value.get(field) {
            None | Some(Json::Null) => Ok(None),
            Some(Json::String(text)) => DateTime::parse_from_rfc3339(text)
                .map(|parsed| Some(parsed.with_timezone(&Utc)))
                .map_err(|e| WireError::malformed("snapshot", e.to_string())),
            Some(_) => Err(WireError::malformed(
                "snapshot",
                format!("{} must be an ISO-8601 string or null", field),
            )),
        }
    };
    Ok(Snapshot::new(
        timestamp("logicalTimestamp")?,
        timestamp("physicalTimestamp")?,
    ))
}

fn override_to_value(overrides: &AdhocOverride) -> Json {
    let point_entries = |map: &indexmap::IndexMap<crate::model::ConnectionPoint, ValueOutcome>| {
        map.iter()
            .map(|(point, outcome)| {
                json!({
                    "key": connection_point_to_value(point),
                    "value": outcome_to_value(outcome),
                })
            })
            .collect::<Vec<Json>>()
    };
    json!({
        "adhocInputs": point_entries(overrides.inputs()),
        "adhocOutputs": point_entries(overrides.outputs()),
        "adhocFlywires": overrides
            .flywires()
            .iter()
            .map(flywire_to_value)
            .collect::<Vec<Json>>(),
    })
}

fn override_from_value(value: &Json) -> Result<AdhocOverride, WireError> {
    let mut overrides = AdhocOverride::new();
    for entry in entry_list(value, "adhoc override", "adhocInputs")? {
        let point = connection_point_from_value(entry_key(entry)?)?;
        let outcome = outcome_from_value(entry_value(entry)?)?;
        overrides = overrides.with_input(point, outcome);
    }
    for entry in entry_list(value, "adhoc override", "adhocOutputs")? {
        let point = connection_point_from_value(entry_key(entry)?)?;
        let outcome = outcome_from_value(entry_value(entry)?)?;
        overrides = overrides.with_output(point, outcome);
    }
    let wires = value
        .get("adhocFlywires")
        .and_then(Json::as_array)
        .ok_or_else(|| WireError::missing_field("adhoc override", "adhocFlywires"))?;
    for wire in wires {
        overrides = overrides.with_flywire(flywire_from_value(wire)?);
    }
    Ok(overrides)
}

fn evaluation_to_value(evaluation: &NodeEvaluation) -> Json {
    let inputs: Vec<Json> = evaluation
        .inputs
        .iter()
        .map(|(resource, input)| {
            json!({
                "key": resource_to_value(resource),
                "value": {
                    "context": input_context_to_value(&input.context),
                    "result": outcome_to_value(&input.outcome),
                },
            })
        })
        .collect();
    let outputs: Vec<Json> = evaluation
        .outputs
        .iter()
        .map(|(resource, output)| {
            json!({
                "key": resource_to_value(resource),
                "value": {
                    "context": { "resultType": output.context.result_type.to_string() },
                    "result": outcome_to_value(&output.outcome),
                },
            })
        })
        .collect();
    json!({ "inputs": inputs, "outputs": outputs })
}

fn evaluation_from_value(value: &Json) -> Result<NodeEvaluation, WireError> {
    let mut evaluation = NodeEvaluation::default();
    for entry in entry_list(value, "node evaluation", "inputs")? {
        let resource = resource_from_value(entry_key(entry)?)?;
        let body = entry_value(entry)?;
        let context = input_context_from_value(
            body.get("context")
                .ok_or_else(|| WireError::missing_field("input result", "context"))?,
        )?;
        let outcome = outcome_from_value(
            body.get("result")
                .ok_or_else(|| WireError::missing_field("input result", "result"))?,
        )?;
        evaluation
            .inputs
            .insert(resource, InputResult { context, outcome });
    }
    for entry in entry_list(value, "node evaluation", "outputs")? {
        let resource = resource_from_value(entry_key(entry)?)?;
        let body = entry_value(entry)?;
        let result_type = match body.get("context").and_then(|c| c.get("resultType")) {
            Some(Json::String(tag)) => output_type_from_str(tag)?,
            _ => return Err(WireError::missing_field("output result", "context.resultType")),
        };
        let outcome = outcome_from_value(
            body.get("result")
                .ok_or_else(|| WireError::missing_field("output result", "result"))?,
        )?;
        evaluation.outputs.insert(
            resource,
            OutputResult {
                context: OutputContext { result_type },
                outcome,
            },
        );
    }
    Ok(evaluation)
}

fn input_context_to_value(context: &InputContext) -> Json {
    json!({
        "sourceType": context.source_type.to_string(),
        "isDirectInput": match context.is_direct {
            Some(flag) => Json::Bool(flag),
            None => Json::Null,
        },
    })
}

fn input_context_from_value(value: &Json) -> Result<InputContext, WireError> {
    let source_type = match crate::wire::node::field_str(value, "input context", "sourceType")? {
        "ByParentGroup" => InputSourceType::ByParentGroup,
        "ByResolve" => InputSourceType::ByResolve,
        "ByFlywire" => InputSourceType::ByFlywire,
        "ByAdhocFlywire" => InputSourceType::ByAdhocFlywire,
        "ByAdhoc" => InputSourceType::ByAdhoc,
        other => {
            return Err(WireError::malformed(
                "input context",
                format!("unknown source type '{}'", other),
            ));
        }
    };
    let is_direct = match value.get("isDirectInput") {
        None | Some(Json::Null) => None,
        Some(Json::Bool(flag)) => Some(*flag),
        Some(_) => {
            return Err(WireError::malformed(
                "input context",
                "isDirectInput must be a boolean or null",
            ));
        }
    };
    Ok(InputContext {
        source_type,
        is_direct,
    })
}

fn output_type_from_str(tag: &str) -> Result<OutputValueType, WireError> {
    match tag {
        "ByEvaluation" => Ok(OutputValueType::ByEvaluation),
        "ByAdhoc" => Ok(OutputValueType::ByAdhoc),
        other => Err(WireError::malformed(
            "output context",
            format!("unknown result type '{}'", other),
        )),
    }
}

fn entry_list<'v>(
    value: &'v Json,
    context: &str,
    field: &str,
) -> Result<&'v [Json], WireError> {
    value
        .get(field)
        .and_then(Json::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| WireError::missing_field(context, field))
}

fn entry_key(entry: &Json) -> Result<&Json, WireError> {
    entry
        .get("key")
        .ok_or_else(|| WireError::missing_field("map entry", "key"))
}

fn entry_value(entry: &Json) -> Result<&Json, WireError> {
    entry
        .get("value")
        .ok_or_else(|| WireError::missing_field("map entry", "value"))
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end evaluation scenarios over the financial demo providers:
//! resolution through groups, flywire overrides, adhoc overrides,
//! conflicts, cycles, sub-graph replay and serialization round trips.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::TimeZone;
use indexmap::{IndexMap, IndexSet};

use crate::builder::GroupBuilder;
use crate::engine::Engine;
use crate::errors::ErrorKind;
use crate::model::{
    AdhocOverride, AtomicNode, CalculationNode, ConnectionPoint, Flywire, InputSourceType,
    NodeBehavior, NodeGroup, NodePath, Outcome, OutputValueType, ResourceId, Snapshot, Value,
    ValueOutcome,
};
use crate::providers::{
    ask_node, attribute_id, bid_node, hardcode_node, mid_spread_node, register_defaults,
    Attribute,
};
use crate::wire::{node_from_json, node_to_json, result_from_json, result_to_json};

fn snapshot() -> Snapshot {
    Snapshot::at(chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
}

fn path(raw: &str) -> NodePath {
    NodePath::parse(raw).unwrap()
}

fn mid_apple() -> ResourceId {
    attribute_id(Attribute::MidPrice, "APPLE", "FALCON")
}

fn ask_bloomberg() -> ResourceId {
    attribute_id(Attribute::Ask, "APPLE", "Bloomberg")
}

fn bid_bloomberg() -> ResourceId {
    attribute_id(Attribute::Bid, "APPLE", "Bloomberg")
}

/// raw { ASK_APPLE, BID_APPLE } / calc { MID_APPLE }
fn quote_tree() -> CalculationNode {
    let raw = NodeGroup::of(
        "raw",
        [
            ask_node("ASK_APPLE", "APPLE", "Bloomberg", 100.25),
            bid_node("BID_APPLE", "APPLE", "Bloomberg", 99.75),
        ],
    )
    .unwrap();
    let calc = NodeGroup::of(
        "calc",
        [mid_spread_node("MID_APPLE", "APPLE", "Bloomberg", "FALCON")],
    )
    .unwrap();
    CalculationNode::Group(NodeGroup::of("root", [raw.into(), calc.into()]).unwrap())
}

/// `quote_tree` plus a hardcoded ask and a root flywire feeding it into calc.
fn hardcoded_ask_tree() -> CalculationNode {
    let mut builder = GroupBuilder::from_node(quote_tree().as_group().unwrap());
    builder
        .add_node(
            &NodePath::root(),
            hardcode_node("hard", Attribute::Ask, "APPLE", "HARDCODED", 120.0),
        )
        .unwrap();
    builder
        .add_flywire(
            &NodePath::root(),
            Flywire::new(
                ConnectionPoint::new(
                    path("/root/hard"),
                    attribute_id(Attribute::Ask, "APPLE", "HARDCODED"),
                ),
                ConnectionPoint::new(path("/root/calc"), ask_bloomberg()),
            )
            .unwrap(),
        )
        .unwrap();
    CalculationNode::Group(builder.to_node().unwrap())
}

fn number(outcome: &ValueOutcome) -> Option<f64> {
    outcome.success().and_then(Value::as_number)
}

#[test]
fn mid_price_derives_from_sibling_quotes() {
    register_defaults();
    let engine = Engine::new(quote_tree()).unwrap();

    let result = engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);

    assert_eq!(number(&result.results[&mid_apple()]), Some(100.0));

    // The calculator saw both quotes as declared dependencies forwarded by
    // its parent group.
    let mid = &result.node_evaluations[&path("/root/calc/MID_APPLE")];
    for resource in [bid_bloomberg(), ask_bloomberg()] {
        let input = &mid.inputs[&resource];
        assert_eq!(input.context.source_type, InputSourceType::ByParentGroup);
        assert_eq!(input.context.is_direct, Some(true));
    }

    // The group-level flows carry no direct-input notion.
    let calc = &result.node_evaluations[&path("/root/calc")];
    for resource in [bid_bloomberg(), ask_bloomberg()] {
        let input = &calc.inputs[&resource];
        assert_eq!(input.context.source_type, InputSourceType::ByResolve);
        assert_eq!(input.context.is_direct, None);
    }
}

#[test]
fn static_flywire_reroutes_the_ask_feed() {
    register_defaults();
    let engine = Engine::new(hardcoded_ask_tree()).unwrap();

    let result = engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);

    // (120 + 99.75) / 2
    assert_eq!(number(&result.results[&mid_apple()]), Some(109.875));

    let calc = &result.node_evaluations[&path("/root/calc")];
    assert_eq!(
        calc.inputs[&ask_bloomberg()].context.source_type,
        InputSourceType::ByFlywire
    );

    // The live Bloomberg ask was never demanded.
    assert!(!result
        .node_evaluations
        .contains_key(&path("/root/raw/ASK_APPLE")));
    assert!(result
        .node_evaluations
        .contains_key(&path("/root/hard")));
}

#[test]
fn adhoc_output_short_circuits_compute() {
    register_defaults();
    let calc = NodeGroup::of(
        "calc",
        [mid_spread_node("MID_GOOGLE", "GOOGLE", "Bloomberg", "FALCON")],
    )
    .unwrap();
    let root = CalculationNode::Group(NodeGroup::of("root", [calc.into()]).unwrap());
    let engine = Engine::new(root).unwrap();

    let spread = attribute_id(Attribute::Spread, "GOOGLE", "FALCON");
    let overrides = AdhocOverride::new().with_output(
        ConnectionPoint::new(path("/root/calc/MID_GOOGLE"), spread.clone()),
        Outcome::Success(Value::Number(1.0)),
    );

    let result = engine.evaluate_for_result(&snapshot(), &[spread.clone()], Some(overrides));

    assert_eq!(number(&result.results[&spread]), Some(1.0));

    let node = &result.node_evaluations[&path("/root/calc/MID_GOOGLE")];
    assert_eq!(
        node.outputs[&spread].context.result_type,
        OutputValueType::ByAdhoc
    );
    // No dependency resolution ran for the substituted output: compute was
    // never reached, so no GOOGLE quotes were demanded.
    assert!(node.inputs.is_empty());
}

#[test]
fn duplicate_producers_conflict_without_poisoning_other_requests() {
    register_defaults();
    let raw = NodeGroup::of(
        "raw",
        [
            bid_node("BID_1", "APPLE", "Bloomberg", 99.75),
            bid_node("BID_2", "APPLE", "Bloomberg", 99.50),
            ask_node("ASK_APPLE", "APPLE", "Bloomberg", 100.25),
        ],
    )
    .unwrap();
    let calc = NodeGroup::of(
        "calc",
        [mid_spread_node("MID_APPLE", "APPLE", "Bloomberg", "FALCON")],
    )
    .unwrap();
    let root = CalculationNode::Group(NodeGroup::of("root", [raw.into(), calc.into()]).unwrap());
    let engine = Engine::new(root).unwrap();

    let result =
        engine.evaluate_for_result(&snapshot(), &[mid_apple(), ask_bloomberg()], None);

    let failure = result.results[&mid_apple()].failure().expect("conflict expected");
    assert_eq!(failure.kind, ErrorKind::ConfigurationConflict);
    assert!(failure.message.contains("/root/raw/BID_1"));
    assert!(failure.message.contains("/root/raw/BID_2"));

    // The unrelated request is unaffected.
    assert_eq!(number(&result.results[&ask_bloomberg()]), Some(100.25));
}

#[test]
fn adhoc_flywire_beats_the_static_one() {
    register_defaults();
    let mut builder = GroupBuilder::from_node(hardcoded_ask_tree().as_group().unwrap());
    builder
        .add_node(
            &NodePath::root(),
            hardcode_node("adhoc_hard", Attribute::Ask, "APPLE", "ADHOC", 200.0),
        )
        .unwrap();
    let engine = Engine::new(CalculationNode::Group(builder.to_node().unwrap())).unwrap();

    let overrides = AdhocOverride::new().with_flywire(
        Flywire::new(
            ConnectionPoint::new(
                path("/root/adhoc_hard"),
                attribute_id(Attribute::Ask, "APPLE", "ADHOC"),
            ),
            ConnectionPoint::new(path("/root/calc"), ask_bloomberg()),
        )
        .unwrap(),
    );

    let result = engine.evaluate_for_result(&snapshot(), &[mid_apple()], Some(overrides));

    // (200 + 99.75) / 2; the static flywire to the 120 hardcode lost.
    assert_eq!(number(&result.results[&mid_apple()]), Some(149.875));
    let calc = &result.node_evaluations[&path("/root/calc")];
    assert_eq!(
        calc.inputs[&ask_bloomberg()].context.source_type,
        InputSourceType::ByAdhocFlywire
    );
}

#[test]
fn adhoc_input_feeds_an_unproducible_resource() {
    register_defaults();
    let calc = NodeGroup::of(
        "calc",
        [mid_spread_node("MID_APPLE", "APPLE", "Bloomberg", "FALCON")],
    )
    .unwrap();
    let root = CalculationNode::Group(NodeGroup::of("root", [calc.into()]).unwrap());
    let engine = Engine::new(root).unwrap();

    let overrides = AdhocOverride::new()
        .with_input(
            ConnectionPoint::new(path("/root/calc/MID_APPLE"), bid_bloomberg()),
            Outcome::Success(Value::Number(10.0)),
        )
        .with_input(
            ConnectionPoint::new(path("/root/calc/MID_APPLE"), ask_bloomberg()),
            Outcome::Success(Value::Number(12.0)),
        );

    let result = engine.evaluate_for_result(&snapshot(), &[mid_apple()], Some(overrides));

    assert_eq!(number(&result.results[&mid_apple()]), Some(11.0));
    let mid = &result.node_evaluations[&path("/root/calc/MID_APPLE")];
    assert_eq!(
        mid.inputs[&bid_bloomberg()].context.source_type,
        InputSourceType::ByAdhoc
    );
}

#[test]
fn unresolved_inputs_fail_without_aborting() {
    register_defaults();
    let calc = NodeGroup::of(
        "calc",
        [mid_spread_node("MID_APPLE", "APPLE", "Bloomberg", "FALCON")],
    )
    .unwrap();
    let root = CalculationNode::Group(NodeGroup::of("root", [calc.into()]).unwrap());
    let engine = Engine::new(root).unwrap();

    let result = engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);

    let failure = result.results[&mid_apple()].failure().expect("failure expected");
    assert_eq!(failure.kind, ErrorKind::UnresolvedInput);
    // The trace is still complete.
    assert!(result
        .node_evaluations
        .contains_key(&path("/root/calc/MID_APPLE")));
}

#[test]
fn evaluation_is_idempotent() {
    register_defaults();
    let engine = Engine::new(hardcoded_ask_tree()).unwrap();

    let first = engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);
    let second = engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);

    assert_eq!(first, second);
}

#[test]
fn serialized_results_are_byte_stable() {
    register_defaults();
    let engine = Engine::new(hardcoded_ask_tree()).unwrap();

    let first = engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);
    let second = engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);

    assert_eq!(
        result_to_json(&first).unwrap(),
        result_to_json(&second).unwrap()
    );
}

#[test]
fn graph_serialization_round_trips() {
    register_defaults();
    let tree = hardcoded_ask_tree();

    let text = node_to_json(&tree).unwrap();
    let rebuilt = node_from_json(&text).unwrap();

    assert_eq!(rebuilt, tree);
}

#[test]
fn consecutive_same_type_nodes_batch_on_the_wire() {
    register_defaults();
    let raw = NodeGroup::of(
        "raw",
        [
            bid_node("BID_APPLE", "APPLE", "Bloomberg", 99.75),
            bid_node("BID_GOOGLE", "GOOGLE", "Bloomberg", 180.50),
            ask_node("ASK_APPLE", "APPLE", "Bloomberg", 100.25),
        ],
    )
    .unwrap();
    let tree = CalculationNode::Group(NodeGroup::of("root", [raw.into()]).unwrap());

    let text = node_to_json(&tree).unwrap();
    // Both bid providers share one typed entry with two parameter records.
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let nodes = &value["parameter"]["nodes"][0]["parameter"]["nodes"];
    assert_eq!(nodes.as_array().unwrap().len(), 2);
    assert_eq!(nodes[0]["type"], "bid_provider");
    assert_eq!(nodes[0]["parameters"].as_array().unwrap().len(), 2);

    assert_eq!(node_from_json(&text).unwrap(), tree);
}

#[test]
fn results_with_overrides_round_trip() {
    register_defaults();
    let calc = NodeGroup::of(
        "calc",
        [mid_spread_node("MID_GOOGLE", "GOOGLE", "Bloomberg", "FALCON")],
    )
    .unwrap();
    let root = CalculationNode::Group(NodeGroup::of("root", [calc.into()]).unwrap());
    let engine = Engine::new(root).unwrap();

    let spread = attribute_id(Attribute::Spread, "GOOGLE", "FALCON");
    let overrides = AdhocOverride::new().with_output(
        ConnectionPoint::new(path("/root/calc/MID_GOOGLE"), spread.clone()),
        Outcome::Success(Value::Number(1.0)),
    );
    let original = engine.evaluate_for_result(&snapshot(), &[spread], Some(overrides));

    let text = result_to_json(&original).unwrap();
    let rebuilt = result_from_json(&text).unwrap();
    assert_eq!(rebuilt, original);
}

#[test]
fn evaluation_result_round_trips_and_replays() {
    register_defaults();
    let engine = Engine::new(hardcoded_ask_tree()).unwrap();
    let original = engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);

    let text = result_to_json(&original).unwrap();
    let rebuilt = result_from_json(&text).unwrap();
    assert_eq!(rebuilt, original);

    // Evaluating the deserialized sub-graph with the same arguments
    // reproduces the original result, trace included.
    let replay_engine = Engine::new(rebuilt.graph.clone()).unwrap();
    let replay = replay_engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);
    assert_eq!(replay, original);
}

#[test]
fn extracted_subgraph_replays_the_evaluation() {
    register_defaults();
    let engine = Engine::new(quote_tree()).unwrap();
    let original = engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);

    let replay_engine = Engine::new(original.graph.clone()).unwrap();
    let replay = replay_engine.evaluate_for_result(&snapshot(), &[mid_apple()], None);

    assert_eq!(replay, original);
    assert_eq!(replay.node_evaluations, original.node_evaluations);
}

// ---------------------------------------------------------------------------
// Custom behaviors for cycle detection and dynamic dependency discovery.
// ---------------------------------------------------------------------------

struct Relay {
    needs: ResourceId,
    makes: ResourceId,
    computed: Arc<AtomicUsize>,
}

impl NodeBehavior for Relay {
    fn type_tag(&self) -> &'static str {
        "relay"
    }

    fn params(&self) -> serde_json::Value {
        serde_json::json!({})
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
        self.computed.fetch_add(1, Ordering::SeqCst);
        let forwarded = match inputs.get(&self.needs) {
            Some(outcome) => outcome.clone(),
            None => Outcome::fail(ErrorKind::UnresolvedInput, "relay input missing"),
        };
        IndexMap::from([(self.makes.clone(), forwarded)])
    }
}

#[test]
fn read_cycles_are_cut_and_computed_once() {
    register_defaults();
    let x = attribute_id(Attribute::Bid, "LOOP", "X");
    let y = attribute_id(Attribute::Bid, "LOOP", "Y");

    let a_runs = Arc::new(AtomicUsize::new(0));
    let b_runs = Arc::new(AtomicUsize::new(0));
    let a = CalculationNode::Atomic(AtomicNode::new(
        "a",
        Arc::new(Relay {
            needs: y.clone(),
            makes: x.clone(),
            computed: a_runs.clone(),
        }),
    ));
    let b = CalculationNode::Atomic(AtomicNode::new(
        "b",
        Arc::new(Relay {
            needs: x.clone(),
            makes: y.clone(),
            computed: b_runs.clone(),
        }),
    ));
    let root = CalculationNode::Group(NodeGroup::of("root", [a, b]).unwrap());
    let engine = Engine::new(root).unwrap();

    let result = engine.evaluate_for_result(&snapshot(), &[x.clone()], None);

    let failure = result.results[&x].failure().expect("cycle failure expected");
    assert_eq!(failure.kind, ErrorKind::CycleDetected);
    assert_eq!(a_runs.load(Ordering::SeqCst), 1);
    assert_eq!(b_runs.load(Ordering::SeqCst), 1);
}

/// Declares only `primary`; requests `fallback` when the primary read fails.
struct FallbackQuote {
    primary: ResourceId,
    fallback: ResourceId,
    makes: ResourceId,
}

impl NodeBehavior for FallbackQuote {
    fn type_tag(&self) -> &'static str {
        "fallback_quote"
    }

    fn params(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    fn inputs(&self) -> IndexSet<ResourceId> {
        IndexSet::from([self.primary.clone()])
    }

    fn outputs(&self) -> IndexSet<ResourceId> {
        IndexSet::from([self.makes.clone()])
    }

    fn resolve_dependencies(
        &self,
        _snapshot: &Snapshot,
        known: &IndexMap<ResourceId, ValueOutcome>,
    ) -> IndexSet<ResourceId> {
        match known.get(&self.primary) {
            None => IndexSet::from([self.primary.clone()]),
            Some(outcome) if outcome.is_failure() && !known.contains_key(&self.fallback) => {
                IndexSet::from([self.fallback.clone()])
            }
            Some(_) => IndexSet::new(),
        }
    }

    fn compute(
        &self,
        _snapshot: &Snapshot,
        inputs: &IndexMap<ResourceId, ValueOutcome>,
    ) -> IndexMap<ResourceId, ValueOutcome> {
        let chosen = match inputs.get(&self.primary) {
            Some(outcome @ Outcome::Success(_)) => outcome.clone(),
            _ => match inputs.get(&self.fallback) {
                Some(outcome) => outcome.clone(),
                None => Outcome::fail(ErrorKind::UnresolvedInput, "no quote available"),
            },
        };
        IndexMap::from([(self.makes.clone(), chosen)])
    }
}

#[test]
fn conditional_dependencies_are_flagged_as_indirect() {
    register_defaults();
    let primary = attribute_id(Attribute::Bid, "APPLE", "PRIMARY");
    let fallback = attribute_id(Attribute::Bid, "APPLE", "FALLBACK");
    let makes = attribute_id(Attribute::Bid, "APPLE", "BEST");

    let node = CalculationNode::Atomic(AtomicNode::new(
        "best_bid",
        Arc::new(FallbackQuote {
            primary: primary.clone(),
            fallback: fallback.clone(),
            makes: makes.clone(),
        }),
    ));
    // Only the fallback feed exists; the primary read fails and triggers
    // discovery of the conditional dependency.
    let root = CalculationNode::Group(
        NodeGroup::of(
            "root",
            [node, bid_node("FALLBACK_BID", "APPLE", "FALLBACK", 42.0)],
        )
        .unwrap(),
    );
    let engine = Engine::new(root).unwrap();

    let result = engine.evaluate_for_result(&snapshot(), &[makes.clone()], None);

    assert_eq!(number(&result.results[&makes]), Some(42.0));

    let best = &result.node_evaluations[&path("/root/best_bid")];
    assert_eq!(best.inputs[&primary].context.is_direct, Some(true));
    assert_eq!(best.inputs[&fallback].context.is_direct, Some(false));
    assert_eq!(
        best.inputs[&fallback].context.source_type,
        InputSourceType::ByResolve
    );
}

#[test]
fn requested_order_is_preserved_and_deduplicated() {
    register_defaults();
    let engine = Engine::new(quote_tree()).unwrap();

    let result = engine.evaluate_for_result(
        &snapshot(),
        &[ask_bloomberg(), mid_apple(), ask_bloomberg()],
        None,
    );

    let keys: Vec<&ResourceId> = result.results.keys().collect();
    assert_eq!(keys, vec![&ask_bloomberg(), &mid_apple()]);
}

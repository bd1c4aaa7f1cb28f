// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;

use anyhow::{Context, Result};

use calcgraph::engine::Engine;
use calcgraph::model::{CalculationNode, NodeGroup, Snapshot, Value};
use calcgraph::providers::{self, Attribute};
use calcgraph::wire;

/// Demo entry point: evaluate a graph definition file, or the built-in
/// mid-price demo when no file is given.
///
/// Usage: `calcgraph [graph.{json,yaml}]`
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    providers::register_defaults();
    wire::registry::freeze();

    let args: Vec<String> = env::args().collect();
    let root = match args.get(1) {
        Some(path) => wire::load_graph(path)
            .with_context(|| format!("failed to load graph definition from '{}'", path))?,
        None => demo_graph()?,
    };

    let engine = Engine::new(root).context("graph failed validation")?;

    let requested = vec![
        providers::attribute_id(Attribute::MidPrice, "APPLE", "FALCON"),
        providers::attribute_id(Attribute::Spread, "APPLE", "FALCON"),
    ];
    let snapshot = Snapshot::at(chrono::Utc::now());
    let result = engine.evaluate_for_result(&snapshot, &requested, None);

    println!("Results at {}:", result.snapshot);
    for (resource, outcome) in &result.results {
        match outcome.success() {
            Some(Value::Number(price)) => println!("  {:<55} {:>10.4}", resource.to_string(), price),
            Some(other) => println!("  {:<55} {}", resource.to_string(), other),
            None => println!("  {:<55} {}", resource.to_string(), outcome),
        }
    }

    println!("\nEvaluated nodes:");
    for (path, evaluation) in &result.node_evaluations {
        println!(
            "  {} ({} inputs, {} outputs)",
            path,
            evaluation.inputs.len(),
            evaluation.outputs.len()
        );
    }

    let serialized = wire::result_to_json(&result).context("failed to serialize result")?;
    println!("\nSerialized evaluation ({} bytes)", serialized.len());

    Ok(())
}

/// The built-in demo: Bloomberg quotes feeding a mid/spread calculator.
fn demo_graph() -> Result<CalculationNode> {
    let raw = NodeGroup::of(
        "raw",
        [
            providers::ask_node("ASK_APPLE", "APPLE", "Bloomberg", 100.25),
            providers::bid_node("BID_APPLE", "APPLE", "Bloomberg", 99.75),
        ],
    )?;
    let calc = NodeGroup::of(
        "calc",
        [providers::mid_spread_node("MID_APPLE", "APPLE", "Bloomberg", "FALCON")],
    )?;
    let root = NodeGroup::of("root", [raw.into(), calc.into()])?;
    Ok(CalculationNode::Group(root))
}

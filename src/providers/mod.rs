// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in market-data providers for the financial demo graphs.
//!
//! These atomic node types exist so demo graphs and the test scenarios have
//! concrete producers and consumers; the engine itself only ever sees their
//! declared inputs/outputs and the `compute` contract.

use std::fmt;
use std::str::FromStr;
use std::sync::Once;

use crate::errors::WireError;
use crate::model::{AtomicNode, CalculationNode, ResourceId, ValueKind};
use crate::wire::registry;

mod hardcode;
mod mid_spread;
mod quote;

pub use hardcode::HardcodeAttributeProvider;
pub use mid_spread::MidSpreadCalculator;
pub use quote::{AskProvider, BidProvider};

/// Market attribute carried by the demo resource identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Bid,
    Ask,
    MidPrice,
    Spread,
}

impl Attribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Bid => "Bid",
            Attribute::Ask => "Ask",
            Attribute::MidPrice => "MidPrice",
            Attribute::Spread => "Spread",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = WireError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Bid" => Ok(Attribute::Bid),
            "Ask" => Ok(Attribute::Ask),
            "MidPrice" => Ok(Attribute::MidPrice),
            "Spread" => Ok(Attribute::Spread),
            other => Err(WireError::malformed(
                "attribute",
                format!("unknown attribute '{}'", other),
            )),
        }
    }
}

/// The `"attribute"`-tagged numeric resource identifier all demo providers
/// speak: `(attribute, instrument, source)`.
pub fn attribute_id(attribute: Attribute, instrument: &str, source: &str) -> ResourceId {
    ResourceId::new("attribute", ValueKind::Number)
        .with_field("attribute", attribute.as_str())
        .with_field("instrument", instrument)
        .with_field("source", source)
}

fn attribute_resource_from_record(data: &serde_json::Value) -> Result<ResourceId, WireError> {
    let attribute: Attribute = record_str(data, "resource data", "attribute")?.parse()?;
    let instrument = record_str(data, "resource data", "instrument")?;
    let source = record_str(data, "resource data", "source")?;
    Ok(attribute_id(attribute, &instrument, &source))
}

static REGISTER: Once = Once::new();

/// Register the demo node and resource tags. Idempotent; call once at
/// startup before any deserialization.
pub fn register_defaults() {
    REGISTER.call_once(|| {
        let registrations = [
            registry::register_node_type("bid_provider", quote::bid_from_record),
            registry::register_node_type("ask_provider", quote::ask_from_record),
            registry::register_node_type("mid_spread_calculator", mid_spread::from_record),
            registry::register_node_type("hardcode_attribute_provider", hardcode::from_record),
            registry::register_resource_type("attribute", attribute_resource_from_record),
        ];
        for result in registrations {
            if let Err(error) = result {
                tracing::warn!(%error, "provider registration skipped");
            }
        }
    });
}

/// Convenience constructor: a named [`BidProvider`] node.
pub fn bid_node(name: &str, instrument: &str, source: &str, price: f64) -> CalculationNode {
    CalculationNode::Atomic(AtomicNode::new(
        name,
        std::sync::Arc::new(BidProvider::new(instrument, source, price)),
    ))
}

/// Convenience constructor: a named [`AskProvider`] node.
pub fn ask_node(name: &str, instrument: &str, source: &str, price: f64) -> CalculationNode {
    CalculationNode::Atomic(AtomicNode::new(
        name,
        std::sync::Arc::new(AskProvider::new(instrument, source, price)),
    ))
}

/// Convenience constructor: a named [`MidSpreadCalculator`] node.
pub fn mid_spread_node(
    name: &str,
    instrument: &str,
    feed_source: &str,
    result_source: &str,
) -> CalculationNode {
    CalculationNode::Atomic(AtomicNode::new(
        name,
        std::sync::Arc::new(MidSpreadCalculator::new(instrument, feed_source, result_source)),
    ))
}

/// Convenience constructor: a named [`HardcodeAttributeProvider`] node.
pub fn hardcode_node(
    name: &str,
    attribute: Attribute,
    instrument: &str,
    source: &str,
    value: f64,
) -> CalculationNode {
    CalculationNode::Atomic(AtomicNode::new(
        name,
        std::sync::Arc::new(HardcodeAttributeProvider::new(
            attribute, instrument, source, value,
        )),
    ))
}

pub(crate) fn record_str(
    record: &serde_json::Value,
    context: &str,
    field: &str,
) -> Result<String, WireError> {
    record
        .get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| WireError::missing_field(context, field))
}

pub(crate) fn record_f64(
    record: &serde_json::Value,
    context: &str,
    field: &str,
) -> Result<f64, WireError> {
    record
        .get(field)
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| WireError::missing_field(context, field))
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::{IndexMap, IndexSet};
use serde_json::json;

use crate::errors::WireError;
use crate::model::{
    AtomicNode, NodeBehavior, Outcome, ResourceId, Snapshot, Value, ValueOutcome,
};
use crate::providers::{attribute_id, record_f64, record_str, Attribute};

/// Quote provider publishing one fixed bid price for one instrument/source.
pub struct BidProvider {
    instrument: String,
    source: String,
    price: f64,
}

impl BidProvider {
    pub fn new(instrument: impl Into<String>, source: impl Into<String>, price: f64) -> Self {
        Self {
            instrument: instrument.into(),
            source: source.into(),
            price,
        }
    }
}

impl NodeBehavior for BidProvider {
    fn type_tag(&self) -> &'static str {
        "bid_provider"
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "instrument": self.instrument,
            "source": self.source,
            "price": self.price,
        })
    }

    fn inputs(&self) -> IndexSet<ResourceId> {
        IndexSet::new()
    }

    fn outputs(&self) -> IndexSet<ResourceId> {
        IndexSet::from([attribute_id(Attribute::Bid, &self.instrument, &self.source)])
    }

    fn compute(
        &self,
        _snapshot: &Snapshot,
        _inputs: &IndexMap<ResourceId, ValueOutcome>,
    ) -> IndexMap<ResourceId, ValueOutcome> {
        IndexMap::from([(
            attribute_id(Attribute::Bid, &self.instrument, &self.source),
            Outcome::Success(Value::Number(self.price)),
        )])
    }
}

/// Quote provider publishing one fixed ask price for one instrument/source.
pub struct AskProvider {
    instrument: String,
    source: String,
    price: f64,
}

impl AskProvider {
    pub fn new(instrument: impl Into<String>, source: impl Into<String>, price: f64) -> Self {
        Self {
            instrument: instrument.into(),
            source: source.into(),
            price,
        }
    }
}

impl NodeBehavior for AskProvider {
    fn type_tag(&self) -> &'static str {
        "ask_provider"
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "instrument": self.instrument,
            "source": self.source,
            "price": self.price,
        })
    }

    fn inputs(&self) -> IndexSet<ResourceId> {
        IndexSet::new()
    }

    fn outputs(&self) -> IndexSet<ResourceId> {
        IndexSet::from([attribute_id(Attribute::Ask, &self.instrument, &self.source)])
    }

    fn compute(
        &self,
        _snapshot: &Snapshot,
        _inputs: &IndexMap<ResourceId, ValueOutcome>,
    ) -> IndexMap<ResourceId, ValueOutcome> {
        IndexMap::from([(
            attribute_id(Attribute::Ask, &self.instrument, &self.source),
            Outcome::Success(Value::Number(self.price)),
        )])
    }
}

pub(crate) fn bid_from_record(record: &serde_json::Value) -> Result<AtomicNode, WireError> {
    let name = record_str(record, "bid_provider", "name")?;
    let provider = BidProvider::new(
        record_str(record, "bid_provider", "instrument")?,
        record_str(record, "bid_provider", "source")?,
        record_f64(record, "bid_provider", "price")?,
    );
    Ok(AtomicNode::new(name, std::sync::Arc::new(provider)))
}

pub(crate) fn ask_from_record(record: &serde_json::Value) -> Result<AtomicNode, WireError> {
    let name = record_str(record, "ask_provider", "name")?;
    let provider = AskProvider::new(
        record_str(record, "ask_provider", "instrument")?,
        record_str(record, "ask_provider", "source")?,
        record_f64(record, "ask_provider", "price")?,
    );
    Ok(AtomicNode::new(name, std::sync::Arc::new(provider)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bid_provider_publishes_its_price() {
        let provider = BidProvider::new("APPLE", "Bloomberg", 99.75);
        let out = provider.compute(&Snapshot::unspecified(), &IndexMap::new());
        let rid = attribute_id(Attribute::Bid, "APPLE", "Bloomberg");
        assert_eq!(
            out.get(&rid).and_then(|o| o.success()).and_then(Value::as_number),
            Some(99.75)
        );
    }

    #[test]
    fn providers_declare_no_inputs() {
        assert!(BidProvider::new("A", "S", 1.0).inputs().is_empty());
        assert!(AskProvider::new("A", "S", 1.0).inputs().is_empty());
    }

    #[test]
    fn records_round_trip_through_constructors() {
        let provider = AskProvider::new("APPLE", "Bloomberg", 100.25);
        let mut record = provider.params();
        record["name"] = serde_json::Value::String("ASK".to_string());
        let rebuilt = ask_from_record(&record).unwrap();
        assert_eq!(rebuilt.name(), "ASK");
        assert_eq!(rebuilt.params(), provider.params());
    }
}

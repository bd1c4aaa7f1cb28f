// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::{IndexMap, IndexSet};
use serde_json::json;

use crate::errors::WireError;
use crate::model::{
    AtomicNode, NodeBehavior, Outcome, ResourceId, Snapshot, Value, ValueOutcome,
};
use crate::providers::{attribute_id, record_f64, record_str, Attribute};

/// Pins one attribute to a fixed value, typically as a flywire source for
/// overriding a live feed.
pub struct HardcodeAttributeProvider {
    attribute: Attribute,
    instrument: String,
    source: String,
    value: f64,
}

impl HardcodeAttributeProvider {
    pub fn new(
        attribute: Attribute,
        instrument: impl Into<String>,
        source: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            attribute,
            instrument: instrument.into(),
            source: source.into(),
            value,
        }
    }

    fn resource(&self) -> ResourceId {
        attribute_id(self.attribute, &self.instrument, &self.source)
    }
}

impl NodeBehavior for HardcodeAttributeProvider {
    fn type_tag(&self) -> &'static str {
        "hardcode_attribute_provider"
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "attribute": self.attribute.as_str(),
            "instrument": self.instrument,
            "source": self.source,
            "value": self.value,
        })
    }

    fn inputs(&self) -> IndexSet<ResourceId> {
        IndexSet::new()
    }

    fn outputs(&self) -> IndexSet<ResourceId> {
        IndexSet::from([self.resource()])
    }

    fn compute(
        &self,
        _snapshot: &Snapshot,
        _inputs: &IndexMap<ResourceId, ValueOutcome>,
    ) -> IndexMap<ResourceId, ValueOutcome> {
        IndexMap::from([(self.resource(), Outcome::Success(Value::Number(self.value)))])
    }
}

pub(crate) fn from_record(record: &serde_json::Value) -> Result<AtomicNode, WireError> {
    let name = record_str(record, "hardcode_attribute_provider", "name")?;
    let attribute: Attribute =
        record_str(record, "hardcode_attribute_provider", "attribute")?.parse()?;
    let provider = HardcodeAttributeProvider::new(
        attribute,
        record_str(record, "hardcode_attribute_provider", "instrument")?,
        record_str(record, "hardcode_attribute_provider", "source")?,
        record_f64(record, "hardcode_attribute_provider", "value")?,
    );
    Ok(AtomicNode::new(name, std::sync::Arc::new(provider)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_the_pinned_value() {
        let provider =
            HardcodeAttributeProvider::new(Attribute::Ask, "APPLE", "HARDCODED", 120.0);
        let out = provider.compute(&Snapshot::unspecified(), &IndexMap::new());
        let rid = attribute_id(Attribute::Ask, "APPLE", "HARDCODED");
        assert_eq!(
            out[&rid].success().and_then(Value::as_number),
            Some(120.0)
        );
    }

    #[test]
    fn record_round_trip() {
        let provider =
            HardcodeAttributeProvider::new(Attribute::Ask, "APPLE", "HARDCODED", 120.0);
        let mut record = provider.params();
        record["name"] = serde_json::Value::String("HARD".to_string());
        let rebuilt = from_record(&record).unwrap();
        assert_eq!(rebuilt.name(), "HARD");
        assert_eq!(rebuilt.params(), provider.params());
    }
}

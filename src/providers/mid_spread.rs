// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::{IndexMap, IndexSet};
use serde_json::json;

use crate::errors::{ErrorKind, WireError};
use crate::model::{
    AtomicNode, NodeBehavior, Outcome, ResourceId, Snapshot, Value, ValueOutcome,
};
use crate::providers::{attribute_id, record_str, Attribute};

/// Derives mid price and spread from the bid/ask of one feed.
///
/// Consumes `Bid`/`Ask` on `feed_source` and publishes `MidPrice`/`Spread`
/// on `result_source`. Input failures propagate unchanged to both outputs;
/// non-numeric inputs are flagged as type incompatibilities.
pub struct MidSpreadCalculator {
    instrument: String,
    feed_source: String,
    result_source: String,
}

impl MidSpreadCalculator {
    pub fn new(
        instrument: impl Into<String>,
        feed_source: impl Into<String>,
        result_source: impl Into<String>,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            feed_source: feed_source.into(),
            result_source: result_source.into(),
        }
    }

    fn bid_id(&self) -> ResourceId {
        attribute_id(Attribute::Bid, &self.instrument, &self.feed_source)
    }

    fn ask_id(&self) -> ResourceId {
        attribute_id(Attribute::Ask, &self.instrument, &self.feed_source)
    }

    fn mid_id(&self) -> ResourceId {
        attribute_id(Attribute::MidPrice, &self.instrument, &self.result_source)
    }

    fn spread_id(&self) -> ResourceId {
        attribute_id(Attribute::Spread, &self.instrument, &self.result_source)
    }

    fn numeric_input(
        &self,
        inputs: &IndexMap<ResourceId, ValueOutcome>,
        resource: &ResourceId,
    ) -> Outcome<f64> {
        match inputs.get(resource) {
            Some(Outcome::Success(value)) => match value.as_number() {
                Some(number) => Outcome::Success(number),
                None => Outcome::fail(
                    ErrorKind::TypeIncompatibility,
                    format!("{} carried {} instead of a number", resource, value.kind()),
                ),
            },
            Some(Outcome::Failure(info)) => Outcome::Failure(info.clone()),
            None => Outcome::fail(
                ErrorKind::UnresolvedInput,
                format!("{} was not supplied", resource),
            ),
        }
    }
}

impl NodeBehavior for MidSpreadCalculator {
    fn type_tag(&self) -> &'static str {
        "mid_spread_calculator"
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "instrument": self.instrument,
            "feedSource": self.feed_source,
            "resultSource": self.result_source,
        })
    }

    fn inputs(&self) -> IndexSet<ResourceId> {
        IndexSet::from([self.bid_id(), self.ask_id()])
    }

    fn outputs(&self) -> IndexSet<ResourceId> {
        IndexSet::from([self.mid_id(), self.spread_id()])
    }

    fn compute(
        &self,
        _snapshot: &Snapshot,
        inputs: &IndexMap<ResourceId, ValueOutcome>,
    ) -> IndexMap<ResourceId, ValueOutcome> {
        let both = self
            .numeric_input(inputs, &self.bid_id())
            .and_then(|bid| self.numeric_input(inputs, &self.ask_id()).map(|ask| (bid, ask)));

        match both {
            Outcome::Success((bid, ask)) => IndexMap::from([
                (
                    self.mid_id(),
                    Outcome::Success(Value::Number((bid + ask) / 2.0)),
                ),
                (
                    self.spread_id(),
                    Outcome::Success(Value::Number(ask - bid)),
                ),
            ]),
            Outcome::Failure(info) => IndexMap::from([
                (self.mid_id(), Outcome::Failure(info.clone())),
                (self.spread_id(), Outcome::Failure(info)),
            ]),
        }
    }
}

pub(crate) fn from_record(record: &serde_json::Value) -> Result<AtomicNode, WireError> {
    let name = record_str(record, "mid_spread_calculator", "name")?;
    let calculator = MidSpreadCalculator::new(
        record_str(record, "mid_spread_calculator", "instrument")?,
        record_str(record, "mid_spread_calculator", "feedSource")?,
        record_str(record, "mid_spread_calculator", "resultSource")?,
    );
    Ok(AtomicNode::new(name, std::sync::Arc::new(calculator)))
}

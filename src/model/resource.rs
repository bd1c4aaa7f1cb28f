// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::model::ValueKind;

/// Identifier of one typed resource flowing through the graph.
///
/// A `ResourceId` is an opaque key: a registered type tag, a record of string
/// fields, and the carried [`ValueKind`] a consumer may assume for its value.
/// Equality and hashing are total over all three parts, so identifiers can key
/// every map in the engine.
///
/// # Examples
///
/// ```
/// use calcgraph::model::{ResourceId, ValueKind};
///
/// let bid = ResourceId::new("attribute", ValueKind::Number)
///     .with_field("attribute", "Bid")
///     .with_field("instrument", "APPLE")
///     .with_field("source", "Bloomberg");
///
/// assert_eq!(bid.tag(), "attribute");
/// assert_eq!(bid.field("instrument"), Some("APPLE"));
/// assert!(bid.accepts(&bid));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    tag: Arc<str>,
    data: BTreeMap<String, String>,
    kind: ValueKind,
}

impl ResourceId {
    pub fn new(tag: impl Into<Arc<str>>, kind: ValueKind) -> Self {
        Self {
            tag: tag.into(),
            data: BTreeMap::new(),
            kind,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Registered serialization tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Key data record, sorted by field name.
    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Carried type of the value behind this identifier.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Type compatibility: can a slot addressed by `self` be fed from a value
    /// produced for `source`?
    pub fn accepts(&self, source: &ResourceId) -> bool {
        self.kind.accepts(source.kind)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.tag)?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(attr: &str) -> ResourceId {
        ResourceId::new("attribute", ValueKind::Number)
            .with_field("attribute", attr)
            .with_field("instrument", "APPLE")
    }

    #[test]
    fn equality_covers_tag_data_and_kind() {
        assert_eq!(rid("Bid"), rid("Bid"));
        assert_ne!(rid("Bid"), rid("Ask"));

        let text_bid = ResourceId::new("attribute", ValueKind::Text)
            .with_field("attribute", "Bid")
            .with_field("instrument", "APPLE");
        assert_ne!(rid("Bid"), text_bid);
    }

    #[test]
    fn display_renders_sorted_fields() {
        let id = rid("Bid");
        assert_eq!(id.to_string(), "attribute{attribute=Bid, instrument=APPLE}");
    }

    #[test]
    fn compatibility_follows_carried_kind() {
        let any = ResourceId::new("attribute", ValueKind::Any).with_field("attribute", "Bid");
        assert!(any.accepts(&rid("Ask")));
        assert!(!rid("Bid").accepts(&any));
    }
}

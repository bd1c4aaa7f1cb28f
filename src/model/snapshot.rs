// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time coordinate of one evaluation.
///
/// Both timestamps are optional and opaque to the engine; they are handed
/// through unchanged to every atomic `compute` call. `logical` is the
/// business-time coordinate, `physical` the wall-clock one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub logical: Option<DateTime<Utc>>,
    pub physical: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(logical: Option<DateTime<Utc>>, physical: Option<DateTime<Utc>>) -> Self {
        Self { logical, physical }
    }

    /// Snapshot with only a logical timestamp.
    pub fn at(logical: DateTime<Utc>) -> Self {
        Self {
            logical: Some(logical),
            physical: None,
        }
    }

    /// Snapshot with neither timestamp set.
    pub fn unspecified() -> Self {
        Self::default()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_ts = |ts: &Option<DateTime<Utc>>| match ts {
            Some(t) => t.to_rfc3339(),
            None => "-".to_string(),
        };
        write!(
            f,
            "snapshot(logical={}, physical={})",
            fmt_ts(&self.logical),
            fmt_ts(&self.physical)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unspecified_has_no_timestamps() {
        let snap = Snapshot::unspecified();
        assert!(snap.logical.is_none());
        assert!(snap.physical.is_none());
    }

    #[test]
    fn at_sets_only_logical() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let snap = Snapshot::at(t);
        assert_eq!(snap.logical, Some(t));
        assert!(snap.physical.is_none());
    }
}

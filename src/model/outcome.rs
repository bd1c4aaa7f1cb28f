// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::errors::{ErrorInfo, ErrorKind};
use crate::model::Value;

/// Per-resource result: a value or a recorded failure.
///
/// Unlike `std::result::Result`, a failure here is data that keeps flowing
/// through the graph: it is stored in evaluation records, fed to downstream
/// `compute` calls, and serialized, never thrown.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(ErrorInfo),
}

/// The outcome shape used throughout evaluation.
pub type ValueOutcome = Outcome<Value>;

impl<T> Outcome<T> {
    /// Failure constructor shorthand.
    pub fn fail(kind: ErrorKind, message: impl Into<String>) -> Self {
        Outcome::Failure(ErrorInfo::new(kind, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ErrorInfo> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(info) => Some(info),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(info) => Outcome::Failure(info),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Success(value) => f(value),
            Outcome::Failure(info) => Outcome::Failure(info),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(value) => write!(f, "Success({})", value),
            Outcome::Failure(info) => write!(f, "Failure({})", info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_transforms_success_only() {
        let ok: Outcome<i32> = Outcome::Success(2);
        assert_eq!(ok.map(|n| n * 10), Outcome::Success(20));

        let err: Outcome<i32> = Outcome::fail(ErrorKind::UnresolvedInput, "missing");
        assert!(err.map(|n| n * 10).is_failure());
    }

    #[test]
    fn and_then_chains_until_first_failure() {
        let chained = Outcome::Success(4)
            .and_then(|n| Outcome::Success(n + 1))
            .and_then(|n: i32| -> Outcome<i32> {
                Outcome::fail(ErrorKind::ComputeFailure, format!("stop at {}", n))
            })
            .and_then(|n| Outcome::Success(n * 100));

        let info = chained.failure().expect("failure expected");
        assert_eq!(info.kind, ErrorKind::ComputeFailure);
        assert_eq!(info.message, "stop at 5");
    }
}

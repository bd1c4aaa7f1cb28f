// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod adhoc;
mod connection;
mod evaluation;
mod node;
mod outcome;
mod path;
mod resource;
mod scope;
mod snapshot;
mod value;

pub use adhoc::AdhocOverride;
pub use connection::{ConnectionPoint, ExportPoint, Flywire};
pub use evaluation::{
    EvaluationResult, InputContext, InputResult, InputSourceType, NodeEvaluation, OutputContext,
    OutputResult, OutputValueType,
};
pub use node::{AtomicNode, CalculationNode, NodeBehavior, NodeGroup};
pub use outcome::{Outcome, ValueOutcome};
pub use path::NodePath;
pub use resource::ResourceId;
pub use scope::Scope;
pub use snapshot::Snapshot;
pub use value::{Value, ValueKind};

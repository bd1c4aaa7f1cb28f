// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;

use crate::model::{ConnectionPoint, Flywire, ValueOutcome};

/// Per-call rewiring: injected inputs, substituted outputs and extra
/// flywires that act only for one evaluation.
///
/// Overrides beat every static rule with the same read site; see the
/// resolver's priority order in [`crate::engine`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdhocOverride {
    adhoc_inputs: IndexMap<ConnectionPoint, ValueOutcome>,
    adhoc_outputs: IndexMap<ConnectionPoint, ValueOutcome>,
    adhoc_flywires: Vec<Flywire>,
}

impl AdhocOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a value as an input at a specific point.
    pub fn with_input(mut self, point: ConnectionPoint, outcome: ValueOutcome) -> Self {
        self.adhoc_inputs.insert(point, outcome);
        self
    }

    /// Substitute a value as an output at a specific point, short-circuiting
    /// the producer's `compute` for that resource.
    pub fn with_output(mut self, point: ConnectionPoint, outcome: ValueOutcome) -> Self {
        self.adhoc_outputs.insert(point, outcome);
        self
    }

    /// Add a flywire that acts only for this call.
    pub fn with_flywire(mut self, flywire: Flywire) -> Self {
        self.adhoc_flywires.push(flywire);
        self
    }

    pub fn inputs(&self) -> &IndexMap<ConnectionPoint, ValueOutcome> {
        &self.adhoc_inputs
    }

    pub fn outputs(&self) -> &IndexMap<ConnectionPoint, ValueOutcome> {
        &self.adhoc_outputs
    }

    pub fn flywires(&self) -> &[Flywire] {
        &self.adhoc_flywires
    }

    pub fn is_empty(&self) -> bool {
        self.adhoc_inputs.is_empty()
            && self.adhoc_outputs.is_empty()
            && self.adhoc_flywires.is_empty()
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod evaluator;
mod extract;
mod resolver;

#[cfg(test)]
mod integration_tests;

pub use evaluator::Engine;
pub use extract::extract_subgraph;

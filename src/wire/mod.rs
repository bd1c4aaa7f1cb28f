// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod node;
pub mod registry;
mod result;

pub use loader::load_graph;
pub use node::{node_from_json, node_to_json};
pub use result::{result_from_json, result_to_json};

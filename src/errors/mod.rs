// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod graph;
mod info;
mod wire;

pub use graph::GraphError;
pub use info::{ErrorInfo, ErrorKind};
pub use wire::WireError;

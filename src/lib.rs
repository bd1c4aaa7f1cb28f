// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod builder;    // mutable graph editing
pub mod engine;     // dependency resolution + evaluation
pub mod errors;     // error handling
pub mod model;      // core data model
pub mod observability;
pub mod providers;  // demo attribute providers
pub mod wire;       // canonical serialization + type registry

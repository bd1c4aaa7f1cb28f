// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for engine diagnostics.
//!
//! Message types are structs implementing `Display` plus [`messages::StructuredLog`],
//! so call sites emit one human-readable line and machine-readable fields
//! without scattering magic strings through the engine:
//!
//! ```rust
//! use calcgraph::observability::messages::{StructuredLog, engine::EvaluationStarted};
//!
//! let msg = EvaluationStarted { path: "/root", requested: 2 };
//! msg.log();
//! ```

pub mod messages;

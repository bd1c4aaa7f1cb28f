// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Organized by subsystem:
//! * `engine` - evaluation lifecycle events
//! * `resolver` - dependency resolution diagnostics (conflicts, cycles)

use std::fmt::Display;

use tracing::Span;

pub mod engine;
pub mod resolver;

/// Emit a message both as human-readable text and as structured fields.
pub trait StructuredLog: Display {
    /// Log at the level appropriate for the message type.
    fn log(&self);

    /// Create a span carrying the message fields as attributes.
    fn span(&self, name: &str) -> Span;
}

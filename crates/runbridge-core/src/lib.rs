//! Core library for the runbridge submission bridge.
//!
//! Connects a user-edited source buffer to an external execution engine:
//! one submit action becomes exactly one engine invocation, and every
//! outcome — value or typed failure — lands on an append-only output
//! channel. The engine itself lives behind a lazily loaded, single-flight
//! boundary and is treated as opaque.
//!
//! # Architecture Overview
//!
//! - **Buffer**: shared editable source text; submissions read immutable
//!   snapshots
//! - **Engine boundary**: provider-agnostic `ExecutionEngine` trait with
//!   process and HTTP implementations behind an injectable factory
//! - **Loader**: idempotent one-time engine acquisition; failures retry on
//!   the next submission
//! - **Bridge**: per-submission orchestration with sequence numbering and
//!   total failure containment
//! - **Output channel**: log, channel, and sequence-filtering sinks
//! - **Configuration**: YAML engine/output selection with validation

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod engine;
pub mod errors;
pub mod output;

pub use bridge::{Submission, SubmissionBridge};
pub use buffer::CodeBuffer;
pub use config::{load_config, BridgeConfig, EngineConfig, OutputConfig};
pub use engine::{EngineFactory, EngineHandle, EngineLoader, ExecutionEngine};
pub use errors::BridgeError;
pub use output::{ChannelSink, LogSink, OutputSink, SequencedSink, SubmissionOutcome};

#[cfg(test)]
pub mod test_utils;

//! Execution engine abstractions and integrations.
//!
//! Defines the core `ExecutionEngine` trait the bridge is written against,
//! plus the loading seam (`EngineFactory` + `EngineLoader`) and the shipped
//! engine implementations: a local interpreter process and a remote HTTP
//! runtime. The bridge treats the engine as opaque — it hands over source
//! text and receives a value or a typed failure, nothing more.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::BridgeError;

pub mod http;
pub mod loader;
pub mod process;

pub use http::{HttpEngine, HttpEngineFactory};
pub use loader::EngineLoader;
pub use process::{ProcessEngine, ProcessEngineFactory};

/// Shared handle to a loaded engine. Acquired once per session and reused by
/// every submission; never mutated after acquisition.
pub type EngineHandle = Arc<dyn ExecutionEngine>;

#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Evaluates source text, returning an opaque value or a failure.
    ///
    /// Empty source is forwarded as-is; whether it is an error is the
    /// engine's call, not the bridge's.
    async fn run_source(&self, source: &str) -> Result<Value, BridgeError>;
}

/// One-time engine loading seam.
///
/// Injected into `EngineLoader` so tests can substitute a scripted engine
/// without touching the bridge. A failed load maps to
/// `BridgeError::EngineUnavailable`.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn load(&self) -> Result<EngineHandle, BridgeError>;
}

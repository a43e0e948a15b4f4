//! Single-flight lazy acquisition of the execution engine.
//!
//! The engine module is loaded at most once per session. Concurrent
//! submissions that arrive before the first load completes all await the
//! same in-flight load rather than triggering duplicates. A failed load is
//! surfaced as `EngineUnavailable` but deliberately not cached, so a later
//! submission retries acquisition instead of permanently failing the
//! session.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::engine::{EngineFactory, EngineHandle};
use crate::errors::BridgeError;

pub struct EngineLoader {
    factory: Arc<dyn EngineFactory>,
    cell: OnceCell<EngineHandle>,
}

impl EngineLoader {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            cell: OnceCell::new(),
        }
    }

    /// Returns the session's engine handle, loading it on first use.
    ///
    /// Idempotent: once a load has succeeded the handle is returned without
    /// consulting the factory again.
    pub async fn acquire(&self) -> Result<EngineHandle, BridgeError> {
        self.cell
            .get_or_try_init(|| async {
                log::info!("Loading execution engine");
                match self.factory.load().await {
                    Ok(engine) => {
                        log::info!("Execution engine loaded");
                        Ok(engine)
                    }
                    Err(err) => {
                        log::error!("Execution engine failed to load: {}", err);
                        Err(match err {
                            BridgeError::EngineUnavailable(_) => err,
                            other => BridgeError::EngineUnavailable(other.to_string()),
                        })
                    }
                }
            })
            .await
            .cloned()
    }

    /// True once a load has completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}

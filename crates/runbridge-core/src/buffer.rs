//! Shared source-text buffer owned by the editing surface.
//!
//! The bridge never holds on to buffer contents. At submission time it takes
//! an owned snapshot, so edits made while a submission is in flight cannot
//! leak into that submission. A buffer starts detached until the editing
//! surface mounts it; reading a detached buffer is a reportable failure, not
//! a panic.

use std::sync::{Arc, RwLock};

use crate::errors::BridgeError;

#[derive(Clone, Default)]
pub struct CodeBuffer {
    inner: Arc<RwLock<Option<String>>>,
}

impl CodeBuffer {
    /// Creates a buffer that is not yet backed by an editing surface.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Creates a mounted buffer with the given initial contents.
    pub fn mounted(initial: impl Into<String>) -> Self {
        let buffer = Self::default();
        buffer.mount(initial);
        buffer
    }

    /// Attaches the editing surface, replacing any previous contents.
    pub fn mount(&self, initial: impl Into<String>) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(initial.into());
    }

    /// Replaces the buffer contents. No-op semantics are up to the caller;
    /// replacing a detached buffer mounts it.
    pub fn replace(&self, text: impl Into<String>) {
        self.mount(text);
    }

    /// Appends text to a mounted buffer.
    pub fn push_str(&self, text: &str) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(contents) = guard.as_mut() {
            contents.push_str(text);
        }
    }

    /// Returns an owned copy of the buffer contents at this moment.
    ///
    /// The empty string is a valid snapshot; only a detached buffer fails.
    pub fn snapshot(&self) -> Result<String, BridgeError> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard
            .clone()
            .ok_or_else(|| BridgeError::BufferReadFailure("editor not mounted".to_string()))
    }
}

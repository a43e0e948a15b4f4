//! Test doubles for the engine boundary and the output channel.
//!
//! The bridge is written against abstract capabilities, so any conforming
//! engine substitutes in tests without touching bridge code. `StubEngine`
//! scripts per-source results and delays, `StubFactory` counts and optionally
//! fails loads, and `CollectingSink` captures outcome records.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::{EngineFactory, EngineHandle, ExecutionEngine};
use crate::errors::BridgeError;
use crate::output::{OutputSink, SubmissionOutcome};

pub struct StubEngine {
    calls: Mutex<Vec<String>>,
    responses: HashMap<String, Result<Value, BridgeError>>,
    delays: HashMap<String, Duration>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: HashMap::new(),
            delays: HashMap::new(),
        }
    }

    /// Scripts the result returned for an exact source string. Unscripted
    /// sources resolve to `Value::Null`.
    pub fn respond(mut self, source: &str, result: Result<Value, BridgeError>) -> Self {
        self.responses.insert(source.to_string(), result);
        self
    }

    /// Delays the response for an exact source string, to force overlap.
    pub fn delay(mut self, source: &str, delay: Duration) -> Self {
        self.delays.insert(source.to_string(), delay);
        self
    }

    /// Every source this engine has been invoked with, in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionEngine for StubEngine {
    async fn run_source(&self, source: &str) -> Result<Value, BridgeError> {
        self.calls.lock().unwrap().push(source.to_string());
        if let Some(delay) = self.delays.get(source) {
            tokio::time::sleep(*delay).await;
        }
        match self.responses.get(source) {
            Some(result) => result.clone(),
            None => Ok(Value::Null),
        }
    }
}

pub struct StubFactory {
    engine: Arc<StubEngine>,
    loads: AtomicUsize,
    failures_remaining: AtomicUsize,
    load_delay: Option<Duration>,
}

impl StubFactory {
    pub fn new(engine: Arc<StubEngine>) -> Self {
        Self {
            engine,
            loads: AtomicUsize::new(0),
            failures_remaining: AtomicUsize::new(0),
            load_delay: None,
        }
    }

    /// Makes the next `count` loads fail with `EngineUnavailable`.
    pub fn fail_loads(self, count: usize) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    /// Stretches every load, to let concurrent acquisitions pile up.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineFactory for StubFactory {
    async fn load(&self) -> Result<EngineHandle, BridgeError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        if self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(BridgeError::EngineUnavailable(
                "scripted load failure".to_string(),
            ));
        }
        Ok(self.engine.clone())
    }
}

#[derive(Default)]
pub struct CollectingSink {
    outcomes: Mutex<Vec<SubmissionOutcome>>,
}

impl CollectingSink {
    pub fn outcomes(&self) -> Vec<SubmissionOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl OutputSink for CollectingSink {
    fn record(&self, outcome: SubmissionOutcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }
}

//! Output channel for submission outcomes.
//!
//! The channel is append-only: every submission produces exactly one record,
//! success or failure, with equal prominence. `LogSink` is the minimal
//! developer-log version; `ChannelSink` exposes outcomes to a front end or a
//! test; `SequencedSink` is the opt-in decorator for surfaces that must only
//! ever display the outcome of the newest submission.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::errors::BridgeError;

/// One record on the output channel.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    /// Monotonically increasing, assigned at dispatch time.
    pub seq: u64,
    pub submitted_at: DateTime<Utc>,
    pub result: Result<Value, BridgeError>,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(value) => write!(f, "submission #{}: {}", self.seq, value),
            Err(err) => write!(f, "submission #{} failed: {}", self.seq, err),
        }
    }
}

pub trait OutputSink: Send + Sync {
    fn record(&self, outcome: SubmissionOutcome);
}

/// Writes outcomes to the log stream. Values at `info`, failures at `error`;
/// same prominence, different severity.
#[derive(Default)]
pub struct LogSink;

impl OutputSink for LogSink {
    fn record(&self, outcome: SubmissionOutcome) {
        if outcome.is_success() {
            log::info!("{}", outcome);
        } else {
            log::error!("{}", outcome);
        }
    }
}

/// Forwards outcomes over an unbounded channel for external observation.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SubmissionOutcome>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SubmissionOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OutputSink for ChannelSink {
    fn record(&self, outcome: SubmissionOutcome) {
        if self.tx.send(outcome).is_err() {
            log::warn!("Output channel receiver dropped; discarding outcome");
        }
    }
}

/// Drops outcomes that arrive after a newer submission's outcome has already
/// been delivered, so the wrapped sink only ever moves forward in submission
/// order.
pub struct SequencedSink<S: OutputSink> {
    inner: S,
    highest_delivered: Mutex<u64>,
}

impl<S: OutputSink> SequencedSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            highest_delivered: Mutex::new(0),
        }
    }
}

impl<S: OutputSink> OutputSink for SequencedSink<S> {
    fn record(&self, outcome: SubmissionOutcome) {
        let mut highest = self
            .highest_delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if outcome.seq <= *highest {
            log::debug!(
                "Discarding stale outcome #{} (newest delivered is #{})",
                outcome.seq,
                *highest
            );
            return;
        }
        *highest = outcome.seq;
        drop(highest);
        self.inner.record(outcome);
    }
}

//! Submission orchestration.
//!
//! Translates one user submit action into exactly one engine invocation and
//! one record on the output channel. The snapshot is taken synchronously at
//! submit time; everything that can suspend (the one-time engine load, the
//! execution itself) happens on a spawned task so the submit path never
//! blocks further input. Overlapping submissions proceed independently and
//! their outcomes carry no ordering guarantee — see `SequencedSink` for the
//! opt-in alternative.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::buffer::CodeBuffer;
use crate::engine::{EngineFactory, EngineLoader};
use crate::output::{OutputSink, SubmissionOutcome};

/// Handle to one in-flight submission.
///
/// Dropping it does not cancel anything; once dispatched, an execution runs
/// to completion.
pub struct Submission {
    pub seq: u64,
    handle: JoinHandle<()>,
}

impl Submission {
    /// Waits until this submission's outcome has been recorded.
    pub async fn finished(self) {
        // The task converts every failure into an outcome record, so a join
        // error can only mean the runtime is shutting down.
        let _ = self.handle.await;
    }
}

pub struct SubmissionBridge {
    loader: Arc<EngineLoader>,
    sink: Arc<dyn OutputSink>,
    next_seq: AtomicU64,
}

impl SubmissionBridge {
    pub fn new(factory: Arc<dyn EngineFactory>, sink: Arc<dyn OutputSink>) -> Self {
        Self::with_loader(Arc::new(EngineLoader::new(factory)), sink)
    }

    /// Builds a bridge around an existing loader, for callers that share one
    /// engine across several bridges.
    pub fn with_loader(loader: Arc<EngineLoader>, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            loader,
            sink,
            next_seq: AtomicU64::new(1),
        }
    }

    /// Submits the buffer's current contents for execution.
    ///
    /// The buffer snapshot is read before this function returns; later edits
    /// never affect this submission. Every outcome, including a failed
    /// snapshot read or a failed engine load, ends up on the output channel —
    /// nothing escapes as an error to the caller.
    pub fn submit(&self, buffer: &CodeBuffer) -> Submission {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let submitted_at = Utc::now();
        let snapshot = buffer.snapshot();

        let loader = self.loader.clone();
        let sink = self.sink.clone();
        let handle = tokio::spawn(async move {
            let result = match snapshot {
                Ok(source) => {
                    log::debug!("Dispatching submission #{} ({} bytes)", seq, source.len());
                    match loader.acquire().await {
                        Ok(engine) => engine.run_source(&source).await,
                        Err(err) => Err(err),
                    }
                }
                Err(err) => {
                    log::warn!("Submission #{} could not read the buffer: {}", seq, err);
                    Err(err)
                }
            };

            sink.record(SubmissionOutcome {
                seq,
                submitted_at,
                result,
            });
        });

        Submission { seq, handle }
    }
}

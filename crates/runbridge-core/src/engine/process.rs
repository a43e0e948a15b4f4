//! Local interpreter engine.
//!
//! Runs a configured interpreter binary once per submission: source text is
//! fed on stdin, stdout becomes the result value, and a non-zero exit or a
//! timeout maps to `ExecutionFailure`. The interpreter binary bounds its own
//! evaluation; the timeout here is the engine's last line of defense, not a
//! bridge concern.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::engine::{EngineFactory, EngineHandle, ExecutionEngine};
use crate::errors::BridgeError;

pub struct ProcessEngine {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessEngine {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl ExecutionEngine for ProcessEngine {
    async fn run_source(&self, source: &str) -> Result<Value, BridgeError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                BridgeError::EngineUnavailable(format!(
                    "failed to spawn '{}': {}",
                    self.command, e
                ))
            })?;

        // The stdin write can block indefinitely when the interpreter never
        // drains the pipe, so it has to sit inside the timed scope along with
        // output collection.
        let stdin = child.stdin.take();
        let run = async move {
            if let Some(mut stdin) = stdin {
                // The interpreter may exit before reading all of stdin; a
                // broken pipe here is resolved by the exit status below.
                if let Err(e) = stdin.write_all(source.as_bytes()).await {
                    log::debug!("Engine closed stdin early: {}", e);
                }
            }
            child.wait_with_output().await
        };

        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(BridgeError::ExecutionFailure(format!(
                    "execution timed out after {:?}",
                    self.timeout
                )))
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        if output.status.success() {
            log::debug!("Interpreter produced {} bytes of output", stdout.len());
            // Structured output passes through untouched; anything else is an
            // opaque string value.
            Ok(serde_json::from_str(&stdout).unwrap_or(Value::String(stdout)))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            let detail = if stderr.is_empty() { stdout } else { stderr };
            Err(BridgeError::ExecutionFailure(format!(
                "interpreter exited with {}: {}",
                output.status, detail
            )))
        }
    }
}

/// Loads the process engine, verifying the interpreter is reachable.
pub struct ProcessEngineFactory {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessEngineFactory {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl EngineFactory for ProcessEngineFactory {
    async fn load(&self) -> Result<EngineHandle, BridgeError> {
        // Explicit paths are checked up front so a missing interpreter is an
        // acquisition failure rather than a per-submission surprise. Bare
        // command names resolve through PATH at spawn time.
        if self.command.contains('/') && !Path::new(&self.command).exists() {
            return Err(BridgeError::EngineUnavailable(format!(
                "interpreter not found at '{}'",
                self.command
            )));
        }

        Ok(Arc::new(ProcessEngine::new(
            self.command.clone(),
            self.args.clone(),
            self.timeout,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(command: &str, args: &[&str]) -> ProcessEngine {
        ProcessEngine::new(
            command,
            args.iter().map(|s| s.to_string()).collect(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn stdout_becomes_the_result_value() {
        let result = engine("cat", &[]).run_source("print(x + y)").await.unwrap();
        assert_eq!(result, Value::String("print(x + y)".to_string()));
    }

    #[tokio::test]
    async fn json_stdout_passes_through_structured() {
        let result = engine("sh", &["-c", "echo 3"]).run_source("").await.unwrap();
        assert_eq!(result, serde_json::json!(3));
    }

    #[tokio::test]
    async fn nonzero_exit_maps_to_execution_failure() {
        let err = engine("sh", &["-c", "echo boom >&2; exit 1"])
            .run_source("")
            .await
            .unwrap_err();
        match err {
            BridgeError::ExecutionFailure(msg) => assert!(msg.contains("boom")),
            other => panic!("expected ExecutionFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn runaway_interpreter_times_out() {
        let slow = ProcessEngine::new(
            "sleep".to_string(),
            vec!["5".to_string()],
            Duration::from_millis(100),
        );
        let err = slow.run_source("").await.unwrap_err();
        match err {
            BridgeError::ExecutionFailure(msg) => assert!(msg.contains("timed out")),
            other => panic!("expected ExecutionFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn timeout_covers_source_delivery() {
        // An interpreter that never reads stdin must not stall the engine
        // past its timeout, even when the source exceeds the pipe buffer.
        let slow = ProcessEngine::new(
            "sleep".to_string(),
            vec!["30".to_string()],
            Duration::from_millis(200),
        );
        let source = "x".repeat(1 << 20);
        let err = slow.run_source(&source).await.unwrap_err();
        match err {
            BridgeError::ExecutionFailure(msg) => assert!(msg.contains("timed out")),
            other => panic!("expected ExecutionFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_interpreter_path_fails_acquisition() {
        let factory = ProcessEngineFactory::new(
            "/nonexistent/interpreter",
            Vec::new(),
            Duration::from_secs(1),
        );
        match factory.load().await {
            Err(BridgeError::EngineUnavailable(_)) => {}
            other => panic!("expected EngineUnavailable, got {:?}", other.err()),
        }
    }
}

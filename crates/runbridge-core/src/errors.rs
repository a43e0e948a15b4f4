//! Error types for failure handling across the submission bridge
//!
//! Every failure mode of a submission collapses into `BridgeError` so that
//! the bridge can convert it into an outcome record at the submission
//! boundary. Nothing here is allowed to escape a submission as an unhandled
//! error; the taxonomy exists so that sinks and callers can tell a missing
//! engine apart from a failing program.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    #[error("Execution engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("Execution failed: {0}")]
    ExecutionFailure(String),
    #[error("Buffer read failed: {0}")]
    BufferReadFailure(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Parsing error: {0}")]
    ParsingError(String),
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::IoError(err.to_string())
    }
}

//! Remote runtime engine over HTTP.
//!
//! Speaks a small JSON protocol to a runtime service: POST the source text,
//! receive either a value or an error description. Transport failures mean
//! the runtime is unreachable (`EngineUnavailable`); a well-formed error
//! reply means the submitted program failed (`ExecutionFailure`).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{EngineFactory, EngineHandle, ExecutionEngine};
use crate::errors::BridgeError;

#[derive(Serialize)]
struct RunRequest<'a> {
    source: &'a str,
}

#[derive(Deserialize)]
struct RunResponse {
    value: Option<Value>,
    error: Option<String>,
}

pub struct HttpEngine {
    pub endpoint_url: String,
    client: Client,
}

impl HttpEngine {
    pub fn new(endpoint_url: String) -> Self {
        Self {
            endpoint_url,
            client: Client::new(),
        }
    }

    fn run_url(&self) -> String {
        format!("{}/run", self.endpoint_url.trim_end_matches('/'))
    }
}

fn parse_run_reply(status: StatusCode, body: &str) -> Result<Value, BridgeError> {
    if !status.is_success() {
        return Err(BridgeError::ExecutionFailure(format!(
            "runtime replied with status {}: {}",
            status, body
        )));
    }

    let reply: RunResponse = serde_json::from_str(body)
        .map_err(|e| BridgeError::ParsingError(format!("malformed runtime reply: {}", e)))?;

    match reply {
        RunResponse {
            error: Some(error), ..
        } => Err(BridgeError::ExecutionFailure(error)),
        RunResponse { value, .. } => Ok(value.unwrap_or(Value::Null)),
    }
}

#[async_trait]
impl ExecutionEngine for HttpEngine {
    async fn run_source(&self, source: &str) -> Result<Value, BridgeError> {
        let request_url = self.run_url();
        log::debug!(
            "HttpEngine sending {} bytes of source to {}",
            source.len(),
            request_url
        );

        let payload = RunRequest { source };
        match self.client.post(&request_url).json(&payload).send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_else(|_| {
                    "Unknown error while reading runtime reply body".to_string()
                });
                let result = parse_run_reply(status, &body);
                if let Err(err) = &result {
                    log::error!("Runtime request to {} failed: {}", request_url, err);
                }
                result
            }
            Err(e) => {
                let err_msg = format!("HTTP request to runtime endpoint failed: {}", e);
                log::error!("{}", err_msg);
                Err(BridgeError::EngineUnavailable(err_msg))
            }
        }
    }
}

/// Loads the HTTP engine after a sanity check on the endpoint.
pub struct HttpEngineFactory {
    endpoint_url: String,
}

impl HttpEngineFactory {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
        }
    }
}

#[async_trait]
impl EngineFactory for HttpEngineFactory {
    async fn load(&self) -> Result<EngineHandle, BridgeError> {
        if !self.endpoint_url.starts_with("http://") && !self.endpoint_url.starts_with("https://")
        {
            return Err(BridgeError::EngineUnavailable(format!(
                "invalid runtime endpoint '{}'",
                self.endpoint_url
            )));
        }
        Ok(Arc::new(HttpEngine::new(self.endpoint_url.clone())))
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! HTTP transport for ubus JSON-RPC calls

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;

use super::envelope::{Request, extract_payload};
use crate::error::{Operation, RpcError};

/// Single-endpoint JSON-RPC transport.
///
/// Keeps cookies between calls and applies the same timeout to every request.
pub struct UbusTransport {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl UbusTransport {
    /// Creates a transport for `url` with a per-call `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Connection`] if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Connection {
                op: Operation::Login,
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one `call` request and returns the result payload object
    pub(crate) async fn call(
        &self,
        op: Operation,
        session: &str,
        object: &str,
        method: &str,
        args: &Value,
    ) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = Request::call(id, session, object, method, args);

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                "{} request #{} -> {}: {}",
                op,
                id,
                self.url,
                redacted(&request, op)
            );
        }

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify(op, &e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify(op, &e))?;
        tracing::debug!("{} response #{} ({}): {}", op, id, status, body);

        if !status.is_success() {
            return Err(RpcError::Http {
                op,
                status: status.as_u16(),
            });
        }

        let parsed: Value = serde_json::from_str(&body).map_err(|e| RpcError::Malformed {
            op,
            reason: format!("invalid JSON: {e}"),
        })?;

        extract_payload(op, parsed)
    }
}

fn classify(op: Operation, error: &reqwest::Error) -> RpcError {
    tracing::debug!("{} transport error details: {:?}", op, error);
    if error.is_timeout() {
        RpcError::Timeout { op }
    } else if let Some(status) = error.status() {
        RpcError::Http {
            op,
            status: status.as_u16(),
        }
    } else {
        RpcError::Connection {
            op,
            reason: error.to_string(),
        }
    }
}

/// Serializes a request for logging with the login password masked
fn redacted(request: &Request<'_>, op: Operation) -> String {
    let mut value = serde_json::to_value(request).unwrap_or(Value::Null);
    if op == Operation::Login {
        if let Some(password) = value.pointer_mut("/params/3/password") {
            *password = Value::String("***".to_string());
        }
    }
    value.to_string()
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! ubus session login

use serde_json::{Value, json};

use super::envelope::ANONYMOUS_SESSION;
use super::transport::UbusTransport;
use crate::error::{Operation, RpcError};

/// Authenticated ubus session.
///
/// Only obtainable through [`Session::login`], so holding one means the
/// handshake succeeded. The token is never changed after login.
pub struct Session {
    transport: UbusTransport,
    token: String,
}

impl Session {
    /// Performs the `session.login` handshake
    ///
    /// # Errors
    ///
    /// Returns the transport or protocol error of the login call, or
    /// [`RpcError::Malformed`] if the payload has no `ubus_rpc_session`.
    pub async fn login(
        transport: UbusTransport,
        username: &str,
        password: &str,
    ) -> Result<Self, RpcError> {
        tracing::debug!("Logging in to {} as {}", transport.url(), username);
        let args = json!({
            "username": username,
            "password": password,
        });
        let payload = transport
            .call(Operation::Login, ANONYMOUS_SESSION, "session", "login", &args)
            .await?;

        let token = payload
            .get("ubus_rpc_session")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RpcError::Malformed {
                op: Operation::Login,
                reason: "login payload has no ubus_rpc_session".to_string(),
            })?
            .to_string();

        tracing::debug!("Login successful, session {}", token);
        Ok(Self { transport, token })
    }

    /// Issues an authenticated call with this session's token
    pub(crate) async fn call(
        &self,
        op: Operation,
        object: &str,
        method: &str,
        args: &Value,
    ) -> Result<Value, RpcError> {
        if self.token.is_empty() {
            return Err(RpcError::NotAuthenticated { op });
        }
        self.transport
            .call(op, &self.token, object, method, args)
            .await
    }

    #[cfg(test)]
    pub(crate) fn unauthenticated(transport: UbusTransport) -> Self {
        Self {
            transport,
            token: String::new(),
        }
    }
}

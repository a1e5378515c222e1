// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! ubus JSON-RPC envelope encoding and result validation

use serde::Serialize;
use serde_json::Value;

use crate::error::{Operation, RpcError};

/// Session id used for the anonymous login call
pub const ANONYMOUS_SESSION: &str = "00000000000000000000000000000000";

/// ubus object exposing the bandix traffic monitor
pub const BANDIX_OBJECT: &str = "luci.bandix";

/// ubus call request
#[derive(Debug, Serialize)]
pub(crate) struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (&'a str, &'a str, &'a str, &'a Value),
}

impl<'a> Request<'a> {
    pub(crate) fn call(
        id: u64,
        session: &'a str,
        object: &'a str,
        method: &'a str,
        args: &'a Value,
    ) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: "call",
            params: (session, object, method, args),
        }
    }
}

/// Symbolic name of a ubus status code
#[must_use]
pub fn status_name(code: i64) -> &'static str {
    match code {
        0 => "UBUS_STATUS_OK",
        1 => "UBUS_STATUS_INVALID_COMMAND",
        2 => "UBUS_STATUS_INVALID_ARGUMENT",
        3 => "UBUS_STATUS_METHOD_NOT_FOUND",
        4 => "UBUS_STATUS_NOT_FOUND",
        5 => "UBUS_STATUS_NO_DATA",
        6 => "UBUS_STATUS_PERMISSION_DENIED",
        7 => "UBUS_STATUS_TIMEOUT",
        8 => "UBUS_STATUS_NOT_SUPPORTED",
        9 => "UBUS_STATUS_UNKNOWN_ERROR",
        10 => "UBUS_STATUS_CONNECTION_FAILED",
        _ => "UBUS_STATUS_UNKNOWN",
    }
}

/// Extracts the payload object from a `{"result": [status, payload]}` response.
///
/// A JSON-RPC `error` member (returned e.g. for an expired session) and a
/// non-zero status both map to [`RpcError::Protocol`]; anything else that
/// does not fit the envelope is [`RpcError::Malformed`].
pub(crate) fn extract_payload(op: Operation, response: Value) -> Result<Value, RpcError> {
    let Value::Object(mut response) = response else {
        return Err(RpcError::Malformed {
            op,
            reason: "response is not a JSON object".to_string(),
        });
    };

    if let Some(error) = response.remove("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(-1);
        let detail = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string);
        return Err(RpcError::Protocol { op, code, detail });
    }

    let result = match response.remove("result") {
        Some(Value::Array(result)) if !result.is_empty() => result,
        Some(other) => {
            return Err(RpcError::Malformed {
                op,
                reason: format!("unexpected result member: {other}"),
            });
        }
        None => {
            let keys: Vec<&String> = response.keys().collect();
            return Err(RpcError::Malformed {
                op,
                reason: format!("missing result member (keys: {keys:?})"),
            });
        }
    };

    let mut result = result.into_iter();
    let code = result
        .next()
        .and_then(|c| c.as_i64())
        .ok_or_else(|| RpcError::Malformed {
            op,
            reason: "result status is not an integer".to_string(),
        })?;
    let payload = result.next();

    if code != 0 {
        let detail = match payload {
            Some(payload) => format!("{} {}", status_name(code), payload),
            None => format!("{} (no detail)", status_name(code)),
        };
        return Err(RpcError::Protocol { op, code, detail });
    }

    match payload {
        Some(payload @ Value::Object(_)) => Ok(payload),
        Some(other) => Err(RpcError::Malformed {
            op,
            reason: format!("result payload is not an object: {other}"),
        }),
        None => Err(RpcError::Malformed {
            op,
            reason: "result carries no payload".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_request_shape() {
        let args = json!({"username": "root", "password": "secret"});
        let request = Request::call(1, ANONYMOUS_SESSION, "session", "login", &args);

        let encoded = serde_json::to_value(&request).unwrap();

        assert_eq!(
            encoded,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "call",
                "params": [
                    "00000000000000000000000000000000",
                    "session",
                    "login",
                    {"username": "root", "password": "secret"}
                ]
            })
        );
    }

    #[test]
    fn test_anonymous_session_is_32_zeros() {
        assert_eq!(ANONYMOUS_SESSION.len(), 32);
        assert!(ANONYMOUS_SESSION.chars().all(|c| c == '0'));
    }

    #[test]
    fn test_extract_payload_success() {
        let response = json!({"jsonrpc": "2.0", "id": 1, "result": [0, {"devices": []}]});
        let payload = extract_payload(Operation::GetStatus, response).unwrap();
        assert_eq!(payload, json!({"devices": []}));
    }

    #[test]
    fn test_extract_payload_non_zero_status() {
        let response = json!({"result": [1, {"message": "denied"}]});
        let err = extract_payload(Operation::Login, response).unwrap_err();
        match err {
            RpcError::Protocol { op, code, detail } => {
                assert_eq!(op, Operation::Login);
                assert_eq!(code, 1);
                assert!(detail.starts_with("UBUS_STATUS_INVALID_COMMAND"));
                assert!(detail.contains("denied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_payload_status_only() {
        let response = json!({"result": [6]});
        let err = extract_payload(Operation::GetMetrics, response).unwrap_err();
        assert!(matches!(err, RpcError::Protocol { code: 6, .. }));
    }

    #[test]
    fn test_extract_payload_jsonrpc_error() {
        let response = json!({
            "jsonrpc": "2.0",
            "id": 2,
            "error": {"code": -32002, "message": "Access denied"}
        });
        let err = extract_payload(Operation::GetStatus, response).unwrap_err();
        match err {
            RpcError::Protocol { code, detail, .. } => {
                assert_eq!(code, -32002);
                assert_eq!(detail, "Access denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_payload_malformed() {
        let cases = vec![
            json!([0, {}]),
            json!({"jsonrpc": "2.0"}),
            json!({"result": []}),
            json!({"result": "ok"}),
            json!({"result": ["0", {}]}),
            json!({"result": [0]}),
            json!({"result": [0, "text"]}),
        ];

        for response in cases {
            let err = extract_payload(Operation::Login, response.clone()).unwrap_err();
            assert!(
                matches!(err, RpcError::Malformed { .. }),
                "expected malformed for {response}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_status_names() {
        assert_eq!(status_name(0), "UBUS_STATUS_OK");
        assert_eq!(status_name(6), "UBUS_STATUS_PERMISSION_DENIED");
        assert_eq!(status_name(42), "UBUS_STATUS_UNKNOWN");
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Error types for the bandix monitor

use std::fmt;

use thiserror::Error;

/// ubus call an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    GetStatus,
    GetMetrics,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Login => "login",
            Self::GetStatus => "getStatus",
            Self::GetMetrics => "getMetrics",
        };
        f.write_str(name)
    }
}

/// Failure of a single ubus JSON-RPC call
#[derive(Debug, Error)]
pub enum RpcError {
    /// Endpoint unreachable
    #[error("{op} failed: cannot connect to router: {reason}")]
    Connection { op: Operation, reason: String },

    /// Non-2xx HTTP status
    #[error("{op} failed: HTTP status {status}")]
    Http { op: Operation, status: u16 },

    /// Request did not complete within the transport timeout
    #[error("{op} failed: request timed out")]
    Timeout { op: Operation },

    /// Body is not JSON or lacks the expected result tuple
    #[error("{op} failed: malformed response: {reason}")]
    Malformed { op: Operation, reason: String },

    /// Well-formed response carrying a failure status
    #[error("{op} failed: router returned {code}: {detail}")]
    Protocol {
        op: Operation,
        code: i64,
        detail: String,
    },

    /// Authenticated call attempted without a session token
    #[error("{op} failed: not authenticated")]
    NotAuthenticated { op: Operation },
}

impl RpcError {
    /// Operation the error belongs to
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Connection { op, .. }
            | Self::Http { op, .. }
            | Self::Timeout { op }
            | Self::Malformed { op, .. }
            | Self::Protocol { op, .. }
            | Self::NotAuthenticated { op } => *op,
        }
    }
}

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or IO error
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// Authentication failed, the run cannot continue
    #[error("Authentication error: {0}")]
    Auth(#[from] RpcError),

    /// Result serialization error
    #[error("Render error: {0}")]
    Render(#[from] serde_json::Error),
}

/// Convenient alias for Result with application error
pub type Result<T> = std::result::Result<T, AppError>;

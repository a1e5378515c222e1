// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! # Bandix Monitor
//!
//! Traffic monitor client for OpenWrt routers running the bandix service.
//!
//! This library logs in to the router's ubus JSON-RPC endpoint, reads the
//! device inventory and the traffic counters of the network and of every
//! device, and normalizes them into one record per subject.
//!
//! ## Main modules
//! - `collector`: metrics normalization and result assembly
//! - `config`: configuration management
//! - `error`: error types
//! - `render`: table and JSON output
//! - `ubus`: ubus transport, session and bandix calls
//! - `units`: human-readable byte and rate strings
//! - `prelude`: commonly used types and traits

mod collector;
mod config;
mod error;
pub mod prelude;
mod render;
mod ubus;
mod units;

// Re-export commonly used types
/// Application configuration
pub use config::{Cli, Config, FileConfig, OutputFormat};

/// Application error and result type
pub use error::{AppError, Operation, Result, RpcError};

/// Traffic collection
pub use collector::{
    CollectOptions, Counters, MetricsPayload, NETWORK_TOTAL_NAME, ResultSet, TIMESTAMP_THRESHOLD,
    TrafficRecord, TrafficSource, collect, collect_from,
};

/// Output rendering
pub use render::{COLLECTION_FAILED, render_json, render_json_error, render_table};

/// ubus session and inventory types
pub use ubus::{Device, DeviceInventory, Session, Subject, UbusTransport, status_name};

/// Unit formatting
pub use units::{format_size, format_speed};

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for convenient use.
//! Users of the library can import everything they need with:
//!
//! ```rust
//! use bandix_monitor::prelude::*;
//! ```

// Core types
pub use crate::config::{Config, OutputFormat};
pub use crate::error::{AppError, Result, RpcError};

// Collection
pub use crate::collector::{CollectOptions, ResultSet, TrafficRecord, TrafficSource, collect};

// ubus client
pub use crate::ubus::{Device, DeviceInventory, Session, Subject};

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! OpenWrt ubus JSON-RPC client module
//!
//! This module talks to the router's `/ubus` endpoint over HTTP, performs the
//! session login and calls the `luci.bandix` traffic monitor.

mod client;
mod envelope;
mod session;
mod transport;
mod types;

// Re-export public types and functions
pub use envelope::status_name;
pub use session::Session;
pub use transport::UbusTransport;
pub use types::{Device, DeviceInventory, NETWORK_SUBJECT, Subject};

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Table and JSON rendering of collected traffic

use std::fmt::Write;

use serde_json::json;

use crate::collector::{ResultSet, TrafficRecord};
use crate::error::Result;

/// Message emitted in JSON mode when collection fails
pub const COLLECTION_FAILED: &str = "Failed to collect data";

const HEADER: [&str; 6] = [
    "Device",
    "IP Address",
    "Download",
    "Upload",
    "Total Down",
    "Total Up",
];
const SEPARATOR_WIDTH: usize = 85;

/// Renders an aligned text table, network total first
#[must_use]
pub fn render_table(set: &ResultSet) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER);
    out.push_str(&"=".repeat(SEPARATOR_WIDTH));
    out.push('\n');
    for record in set.total.iter().chain(&set.devices) {
        push_record(&mut out, record);
    }
    out
}

fn push_record(out: &mut String, record: &TrafficRecord) {
    push_row(
        out,
        [
            record.device_name.as_str(),
            record.ip.as_str(),
            record.down_speed_human.as_str(),
            record.up_speed_human.as_str(),
            record.total_down_human.as_str(),
            record.total_up_human.as_str(),
        ],
    );
}

fn push_row(out: &mut String, cells: [&str; 6]) {
    let [name, ip, down, up, total_down, total_up] = cells;
    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "{name:<20} {ip:<15} {down:<12} {up:<12} {total_down:<12} {total_up:<12}"
    );
}

/// Renders the result set as indented JSON
///
/// # Errors
///
/// Returns [`crate::AppError::Render`] if serialization fails.
pub fn render_json(set: &ResultSet) -> Result<String> {
    Ok(serde_json::to_string_pretty(set)?)
}

/// JSON document printed when collection fails
#[must_use]
pub fn render_json_error() -> String {
    serde_json::to_string_pretty(&json!({ "error": COLLECTION_FAILED }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{COLLECTION_FAILED}\"}}"))
}

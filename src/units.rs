// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Human-readable byte and rate formatting

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
const SPEED_UNITS: [&str; 3] = ["B/s", "KB/s", "MB/s"];

/// Formats a byte count, e.g. `1536` -> `"1.50 KB"`
#[must_use]
pub fn format_size(bytes: u64) -> String {
    scale(bytes, &SIZE_UNITS)
}

/// Formats a byte rate, e.g. `2048` -> `"2.00 KB/s"`
#[must_use]
pub fn format_speed(bytes_per_sec: u64) -> String {
    scale(bytes_per_sec, &SPEED_UNITS)
}

/// Divides by 1024 until the value fits the unit or the largest unit is reached
#[allow(clippy::cast_precision_loss)]
fn scale(value: u64, units: &[&str]) -> String {
    if value == 0 {
        return format!("0 {}", units[0]);
    }
    let mut scaled = value as f64;
    let mut idx = 0;
    while scaled >= 1024.0 && idx < units.len() - 1 {
        scaled /= 1024.0;
        idx += 1;
    }
    format!("{scaled:.2} {}", units[idx])
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Metrics payload shape detection and reduction
//!
//! bandix answers `getMetrics` either with a snapshot (one row per subject,
//! first field is the subject) or with a time series (first field is a
//! millisecond timestamp). Both reduce to at most one [`Counters`] value.

use serde_json::Value;

use super::record::Counters;
use crate::ubus::{NETWORK_SUBJECT, Subject};

/// First-field values above this are millisecond timestamps
pub const TIMESTAMP_THRESHOLD: f64 = 1_000_000_000_000.0;

/// Minimum number of fields in a usable row
const MIN_ROW_FIELDS: usize = 9;

const DOWN_SPEED_IDX: usize = 1;
const UP_SPEED_IDX: usize = 2;
const TOTAL_DOWN_IDX: usize = 7;
const TOTAL_UP_IDX: usize = 8;

/// Classified `getMetrics` payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricsPayload<'a> {
    TimeSeries(&'a [Value]),
    Snapshot(&'a [Value]),
}

impl<'a> MetricsPayload<'a> {
    /// Looks at the first field of the first row only
    #[must_use]
    pub fn classify(rows: &'a [Value]) -> Self {
        let first_field = rows
            .first()
            .and_then(Value::as_array)
            .and_then(|row| row.first())
            .and_then(Value::as_f64);
        match first_field {
            Some(ts) if ts > TIMESTAMP_THRESHOLD => Self::TimeSeries(rows),
            _ => Self::Snapshot(rows),
        }
    }

    /// Reduces the payload to the counters of `subject`, if any row qualifies
    #[must_use]
    pub fn reduce(&self, subject: &Subject) -> Option<Counters> {
        match *self {
            Self::TimeSeries(rows) => latest_sample(rows),
            Self::Snapshot(rows) => first_snapshot_row(rows, subject),
        }
    }
}

/// Takes the last row with enough fields; older samples are never consulted
fn latest_sample(rows: &[Value]) -> Option<Counters> {
    rows.iter().rev().find(|row| has_min_fields(row)).and_then(parse_row)
}

/// Stops at the first row with enough fields; later rows are never consulted.
///
/// For the network subject the row must also be tagged `"all"`.
fn first_snapshot_row(rows: &[Value], subject: &Subject) -> Option<Counters> {
    rows.iter()
        .find(|row| {
            has_min_fields(row)
                && (*subject != Subject::Network || is_network_row(row))
        })
        .and_then(parse_row)
}

fn has_min_fields(row: &Value) -> bool {
    row.as_array()
        .is_some_and(|fields| fields.len() >= MIN_ROW_FIELDS)
}

fn is_network_row(row: &Value) -> bool {
    row.as_array()
        .and_then(|fields| fields.first())
        .and_then(Value::as_str)
        .is_some_and(|tag| tag == NETWORK_SUBJECT)
}

/// Extracts counters from the selected row; any unusable counter voids it
fn parse_row(row: &Value) -> Option<Counters> {
    let counters = row.as_array().and_then(|fields| read_counters(fields));
    if counters.is_none() {
        tracing::debug!("Selected metric row has unusable counters: {}", row);
    }
    counters
}

fn read_counters(fields: &[Value]) -> Option<Counters> {
    if fields.len() < MIN_ROW_FIELDS {
        return None;
    }
    Some(Counters {
        down_speed: counter(&fields[DOWN_SPEED_IDX])?,
        up_speed: counter(&fields[UP_SPEED_IDX])?,
        total_down: counter(&fields[TOTAL_DOWN_IDX])?,
        total_up: counter(&fields[TOTAL_UP_IDX])?,
    })
}

/// Reads a non-negative counter, dropping any fractional part
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn counter(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64().filter(|f| f.is_finite() && *f >= 0.0)?;
    if f.fract() != 0.0 {
        tracing::debug!("Truncating fractional counter {} to {}", f, f.trunc());
    }
    Some(f as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TS: u64 = 1_700_000_000_000;

    fn device() -> Subject {
        Subject::Device("aa:bb:cc:dd:ee:ff".to_string())
    }

    #[test]
    fn test_classify_timestamp_is_time_series() {
        let rows = vec![json!([TS, 1, 2, 0, 0, 0, 0, 3, 4])];
        assert!(matches!(
            MetricsPayload::classify(&rows),
            MetricsPayload::TimeSeries(_)
        ));
    }

    #[test]
    fn test_classify_small_or_text_first_field_is_snapshot() {
        let at_threshold = vec![json!([1_000_000_000_000u64, 1, 2, 0, 0, 0, 0, 3, 4])];
        let small = vec![json!([42, 1, 2, 0, 0, 0, 0, 3, 4])];
        let text = vec![json!(["all", 1, 2, 0, 0, 0, 0, 3, 4])];
        let empty: Vec<Value> = Vec::new();
        let empty_row = vec![json!([])];

        for rows in [&at_threshold, &small, &text, &empty, &empty_row] {
            assert!(matches!(
                MetricsPayload::classify(rows),
                MetricsPayload::Snapshot(_)
            ));
        }
    }

    #[test]
    fn test_time_series_picks_last_well_formed_row() {
        let rows = vec![
            json!([TS + 100, 1, 1, 0, 0, 0, 0, 10, 10]),
            json!([TS + 200, 2, 2, 0, 0, 0, 0, 20]),
            json!([TS + 300, 3, 3, 0, 0, 0, 0, 30, 30]),
        ];

        let counters = MetricsPayload::classify(&rows)
            .reduce(&Subject::Network)
            .unwrap();

        assert_eq!(counters.down_speed, 3);
        assert_eq!(counters.total_down, 30);
    }

    #[test]
    fn test_time_series_skips_short_trailing_rows() {
        let rows = vec![
            json!([TS + 100, 1, 1, 0, 0, 0, 0, 10, 10]),
            json!([TS + 200, 2, 2, 0, 0, 0, 0, 20, 20]),
            json!([TS + 300, 3, 3]),
        ];

        let counters = MetricsPayload::classify(&rows).reduce(&device()).unwrap();

        assert_eq!(
            counters,
            Counters {
                down_speed: 2,
                up_speed: 2,
                total_down: 20,
                total_up: 20,
            }
        );
    }

    #[test]
    fn test_time_series_without_qualifying_row() {
        let rows = vec![json!([TS, 1, 2]), json!([TS + 1, 1, 2, 3])];
        assert_eq!(MetricsPayload::classify(&rows).reduce(&Subject::Network), None);
    }

    #[test]
    fn test_snapshot_stops_at_first_match() {
        let rows = vec![
            json!(["all", 5, 6, 0, 0, 0, 0, 700, 800]),
            json!(["all", 9, 9, 0, 0, 0, 0, 111, 222]),
        ];

        let counters = MetricsPayload::classify(&rows)
            .reduce(&Subject::Network)
            .unwrap();

        assert_eq!(
            counters,
            Counters {
                down_speed: 5,
                up_speed: 6,
                total_down: 700,
                total_up: 800,
            }
        );
    }

    #[test]
    fn test_snapshot_network_requires_all_tag() {
        let rows = vec![
            json!(["aa:bb:cc:dd:ee:ff", 1, 1, 0, 0, 0, 0, 1, 1]),
            json!(["all", 7]),
            json!(["all", 2, 3, 0, 0, 0, 0, 4, 5]),
        ];

        let counters = MetricsPayload::classify(&rows)
            .reduce(&Subject::Network)
            .unwrap();

        assert_eq!(counters.down_speed, 2);
        assert_eq!(counters.total_up, 5);
    }

    #[test]
    fn test_snapshot_device_takes_first_well_formed_row() {
        let rows = vec![
            json!(["aa:bb:cc:dd:ee:ff", 1]),
            json!(["aa:bb:cc:dd:ee:ff", 8, 9, 0, 0, 0, 0, 10, 11]),
            json!(["aa:bb:cc:dd:ee:ff", 1, 1, 0, 0, 0, 0, 1, 1]),
        ];

        let counters = MetricsPayload::classify(&rows).reduce(&device()).unwrap();

        assert_eq!(counters.down_speed, 8);
        assert_eq!(counters.total_up, 11);
    }

    #[test]
    fn test_short_and_non_array_rows_never_panic() {
        let rows = vec![
            json!(null),
            json!("all"),
            json!({"mac": "all"}),
            json!([]),
            json!(["all", 1, 2, 3, 4, 5, 6, 7]),
        ];

        assert_eq!(MetricsPayload::classify(&rows).reduce(&Subject::Network), None);
        assert_eq!(MetricsPayload::classify(&rows).reduce(&device()), None);
    }

    #[test]
    fn test_unusable_counters_void_the_selected_row() {
        for bad in [json!("fast"), json!(-1), json!(null)] {
            let rows = vec![
                json!(["all", bad, 1, 0, 0, 0, 0, 1, 1]),
                json!(["all", 1, 2, 0, 0, 0, 0, 3, 4]),
            ];
            assert_eq!(MetricsPayload::classify(&rows).reduce(&Subject::Network), None);
        }
    }

    #[test]
    fn test_snapshot_never_reads_past_selected_row() {
        let rows = vec![
            json!(["all", -1, 6, 0, 0, 0, 0, 700, 800]),
            json!(["all", 9, 9, 0, 0, 0, 0, 111, 222]),
        ];

        assert_eq!(MetricsPayload::classify(&rows).reduce(&Subject::Network), None);
    }

    #[test]
    fn test_time_series_never_falls_back_to_older_sample() {
        let rows = vec![
            json!([TS, 1, 1, 0, 0, 0, 0, 10, 10]),
            json!([TS + 1, 2.75, 2, 0, 0, 0, 0, null, 20]),
        ];

        assert_eq!(MetricsPayload::classify(&rows).reduce(&device()), None);
    }

    #[test]
    fn test_fractional_counters_are_truncated() {
        let rows = vec![json!([TS, 2.75, 2, 0, 0, 0, 0, 10.9, 4])];

        let counters = MetricsPayload::classify(&rows).reduce(&device()).unwrap();

        assert_eq!(
            counters,
            Counters {
                down_speed: 2,
                up_speed: 2,
                total_down: 10,
                total_up: 4,
            }
        );
    }
}

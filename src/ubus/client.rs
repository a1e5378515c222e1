// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! bandix service calls

use serde_json::{Value, json};

use super::envelope::BANDIX_OBJECT;
use super::session::Session;
use super::types::{DeviceInventory, Subject};
use crate::error::{Operation, RpcError};

impl Session {
    /// Fetches the device inventory of the monitored network
    ///
    /// # Errors
    ///
    /// Returns the transport or protocol error of the `getStatus` call.
    pub async fn get_status(&self) -> Result<DeviceInventory, RpcError> {
        let payload = self
            .call(Operation::GetStatus, BANDIX_OBJECT, "getStatus", &json!({}))
            .await?;
        let inventory = DeviceInventory::from_status(&payload);
        tracing::debug!("Inventory contains {} device(s)", inventory.len());
        Ok(inventory)
    }

    /// Fetches the raw metric rows for `subject`, uninterpreted.
    ///
    /// A payload without a `metrics` array yields no rows.
    ///
    /// # Errors
    ///
    /// Returns the transport or protocol error of the `getMetrics` call.
    pub async fn get_metrics(&self, subject: &Subject) -> Result<Vec<Value>, RpcError> {
        let args = json!({ "mac": subject.as_wire() });
        let payload = self
            .call(Operation::GetMetrics, BANDIX_OBJECT, "getMetrics", &args)
            .await?;
        Ok(metric_rows(payload))
    }
}

fn metric_rows(mut payload: Value) -> Vec<Value> {
    match payload.get_mut("metrics").map(Value::take) {
        Some(Value::Array(rows)) => rows,
        Some(other) => {
            tracing::warn!("Ignoring non-array metrics member: {}", other);
            Vec::new()
        }
        None => Vec::new(),
    }
}

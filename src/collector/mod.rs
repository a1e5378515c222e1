// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Traffic collection module for the bandix service
//!
//! Logs in, reads the device inventory and folds the metrics of the network
//! and of every device into one [`ResultSet`].

mod record;
mod shape;

use std::future::Future;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use serde_json::Value;

pub use record::{Counters, NETWORK_TOTAL_NAME, ResultSet, TrafficRecord};
pub use shape::{MetricsPayload, TIMESTAMP_THRESHOLD};

use crate::error::RpcError;
use crate::ubus::{Device, DeviceInventory, Session, Subject, UbusTransport};

/// Connection settings for one collection run
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    /// Upper bound on concurrent per-device metric requests
    pub concurrency: usize,
}

/// Source of inventory and raw metrics, implemented by [`Session`]
pub trait TrafficSource {
    fn get_status(&self) -> impl Future<Output = Result<DeviceInventory, RpcError>>;

    fn get_metrics(&self, subject: &Subject)
    -> impl Future<Output = Result<Vec<Value>, RpcError>>;
}

impl TrafficSource for Session {
    fn get_status(&self) -> impl Future<Output = Result<DeviceInventory, RpcError>> {
        Session::get_status(self)
    }

    fn get_metrics(
        &self,
        subject: &Subject,
    ) -> impl Future<Output = Result<Vec<Value>, RpcError>> {
        Session::get_metrics(self, subject)
    }
}

/// Authenticates and collects one result set.
///
/// # Errors
///
/// Only a failed login is an error; every later failure drops the affected
/// record and the run continues.
pub async fn collect(options: &CollectOptions) -> Result<ResultSet, RpcError> {
    let transport = UbusTransport::new(&options.url, options.timeout)?;
    let session = Session::login(transport, &options.username, &options.password).await?;
    tracing::info!("Logged in to {}", options.url);
    Ok(collect_from(&session, options.concurrency).await)
}

/// Collects the network total and one record per inventory device.
///
/// Device records keep inventory order whatever order the requests finish in.
pub async fn collect_from<S: TrafficSource>(source: &S, concurrency: usize) -> ResultSet {
    let inventory = match source.get_status().await {
        Ok(inventory) => inventory,
        Err(e) => {
            tracing::warn!("Continuing without device inventory: {}", e);
            DeviceInventory::default()
        }
    };

    let total = fetch_counters(source, &Subject::Network)
        .await
        .map(TrafficRecord::network_total);
    if total.is_none() {
        tracing::warn!("No network total available for this run");
    }

    let devices: Vec<TrafficRecord> = stream::iter(inventory.iter())
        .map(|device| fetch_device(source, device))
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .flatten()
        .collect();

    tracing::info!(
        "Collected traffic for {} of {} device(s)",
        devices.len(),
        inventory.len()
    );

    ResultSet { devices, total }
}

async fn fetch_device<S: TrafficSource>(source: &S, device: &Device) -> Option<TrafficRecord> {
    let subject = Subject::Device(device.mac.clone());
    let counters = fetch_counters(source, &subject).await?;
    Some(TrafficRecord::for_device(device, counters))
}

async fn fetch_counters<S: TrafficSource>(source: &S, subject: &Subject) -> Option<Counters> {
    let rows = match source.get_metrics(subject).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", subject.as_wire(), e);
            tracing::debug!("Error details for {}: {:?}", subject.as_wire(), e);
            return None;
        }
    };

    let payload = MetricsPayload::classify(&rows);
    let counters = payload.reduce(subject);
    match counters {
        Some(c) => tracing::trace!("{} -> {:?} from {:?}", subject.as_wire(), c, payload),
        None => tracing::debug!(
            "No usable metric row for {} in {} row(s)",
            subject.as_wire(),
            rows.len()
        ),
    }
    counters
}

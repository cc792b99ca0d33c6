use dashmap::DashMap;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::metrics;
use crate::models::ElectricityReading;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Point-in-time view of one meter's readings
///
/// Always non-empty: a series only comes into existence through a successful
/// append, and appends reject empty input. Cloning shares the underlying
/// buffer, so a snapshot is never affected by later appends.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSeries(Arc<Vec<ElectricityReading>>);

impl ReadingSeries {
    pub fn to_vec(&self) -> Vec<ElectricityReading> {
        self.0.as_ref().clone()
    }
}

impl Deref for ReadingSeries {
    type Target = [ElectricityReading];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Per-meter reading history, safe for concurrent appends and reads
///
/// Appends to one meter id are serialised by the map's shard lock, so two
/// concurrent appends on the same key never lose readings. Readers clone the
/// `Arc` and observe either the full pre-append or the full post-append
/// series; an appender that finds the buffer shared copies it first.
#[derive(Debug, Default)]
pub struct ReadingStore {
    series: DashMap<String, Arc<Vec<ElectricityReading>>>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `readings` to `meter_id`, creating the series if needed.
    ///
    /// Readings are concatenated in arrival order and not re-sorted.
    pub fn append(
        &self,
        meter_id: &str,
        readings: Vec<ElectricityReading>,
    ) -> Result<(), StoreError> {
        if meter_id.is_empty() {
            return Err(StoreError::InvalidInput(
                "smart meter id must not be empty".to_string(),
            ));
        }
        if readings.is_empty() {
            return Err(StoreError::InvalidInput(format!(
                "no electricity readings supplied for meter '{}'",
                meter_id
            )));
        }

        let appended = readings.len();
        let mut entry = self.series.entry(meter_id.to_string()).or_default();
        Arc::make_mut(entry.value_mut()).extend(readings);
        let total = entry.len();
        drop(entry);

        debug!(meter_id = %meter_id, appended, total, "Stored electricity readings");
        metrics::record_readings_stored(meter_id, appended);
        Ok(())
    }

    pub fn get(&self, meter_id: &str) -> Option<ReadingSeries> {
        self.series
            .get(meter_id)
            .map(|entry| ReadingSeries(Arc::clone(entry.value())))
    }

    pub fn meter_count(&self) -> usize {
        self.series.len()
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single instantaneous consumption sample, in kW
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectricityReading {
    pub time: DateTime<Utc>,
    pub reading: Decimal,
}

impl ElectricityReading {
    pub fn new(time: DateTime<Utc>, reading: Decimal) -> Self {
        Self { time, reading }
    }
}

/// Body of `POST /readings/store`
///
/// Both fields are optional on the wire so that a missing meter id or a
/// `null` reading list surfaces as invalid input rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterReadings {
    #[serde(default)]
    pub smart_meter_id: Option<String>,
    #[serde(default)]
    pub electricity_readings: Option<Vec<ElectricityReading>>,
}

pub mod price_plan;
pub mod reading;

pub use price_plan::{DayOfWeek, PeakTimeMultiplier, PeriodType, PricePlan};
pub use reading::{ElectricityReading, MeterReadings};

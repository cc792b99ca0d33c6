use chrono::{Datelike, NaiveDateTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a multiplier models a peak or an off-peak window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    Peak,
    OffPeak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// Wire format for peak window boundaries: `yyyy-MM-dd HH:mm:ss`
pub mod window_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A day-of-week + time-window override that multiplies a plan's unit rate
///
/// Equality is full field equality; it is what `add_peak_multiplier` uses to
/// decide whether an incoming rule replaces an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakTimeMultiplier {
    pub period: PeriodType,
    pub day_of_week: DayOfWeek,
    pub multiplier: Decimal,
    #[serde(with = "window_format")]
    pub start_date_time: NaiveDateTime,
    #[serde(with = "window_format")]
    pub end_date_time: NaiveDateTime,
}

impl PeakTimeMultiplier {
    /// Active iff the weekday matches and `start <= at <= end`
    pub fn is_active_during(&self, at: NaiveDateTime) -> bool {
        DayOfWeek::from(at.weekday()) == self.day_of_week
            && at >= self.start_date_time
            && at <= self.end_date_time
    }
}

/// A supplier's pricing scheme: a base unit rate plus ordered peak overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePlan {
    pub id: String,
    pub supplier: String,
    /// Price per kWh
    pub unit_rate: Decimal,
    #[serde(default)]
    pub peak_time_multipliers: Vec<PeakTimeMultiplier>,
}

impl PricePlan {
    pub fn new(id: impl Into<String>, supplier: impl Into<String>, unit_rate: Decimal) -> Self {
        Self {
            id: id.into(),
            supplier: supplier.into(),
            unit_rate,
            peak_time_multipliers: Vec::new(),
        }
    }

    pub fn with_peak_time_multipliers(mut self, multipliers: Vec<PeakTimeMultiplier>) -> Self {
        self.peak_time_multipliers = multipliers;
        self
    }

    /// Effective price at `at`
    ///
    /// The first rule in list order that is active wins; its multiplier is
    /// applied to the unit rate. Without an active rule the unit rate applies.
    pub fn price_at(&self, at: NaiveDateTime) -> Decimal {
        self.peak_time_multipliers
            .iter()
            .find(|rule| rule.is_active_during(at))
            .map(|rule| self.unit_rate.saturating_mul(rule.multiplier))
            .unwrap_or(self.unit_rate)
    }

    /// Drop any rule equal to `rule`, then append it
    pub fn upsert_peak_time_multiplier(&mut self, rule: PeakTimeMultiplier) {
        self.peak_time_multipliers.retain(|existing| *existing != rule);
        self.peak_time_multipliers.push(rule);
    }
}

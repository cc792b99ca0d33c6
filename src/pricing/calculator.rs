use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::models::{ElectricityReading, PricePlan};

const SECONDS_PER_HOUR: i64 = 3600;

/// Divide keeping the dividend's scale, rounding half away from zero.
///
/// `None` when the divisor is zero or the quotient overflows.
fn divide_half_up(dividend: Decimal, divisor: Decimal) -> Option<Decimal> {
    let scale = dividend.scale();
    let mut quotient = dividend
        .checked_div(divisor)?
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    quotient.rescale(scale);
    Some(quotient)
}

/// Arithmetic mean of the reading values, `None` for an empty slice
pub fn average_reading(readings: &[ElectricityReading]) -> Option<Decimal> {
    if readings.is_empty() {
        return None;
    }

    let sum = readings
        .iter()
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.reading))?;
    divide_half_up(sum, Decimal::from(readings.len()))
}

/// Hours between the chronologically first and last reading.
///
/// Scans for the extremes, so the slice does not need to be sorted.
pub fn elapsed_hours(readings: &[ElectricityReading]) -> Decimal {
    let first = readings.iter().map(|r| r.time).min();
    let last = readings.iter().map(|r| r.time).max();

    match (first, last) {
        (Some(first), Some(last)) => {
            let seconds = (last - first).num_seconds();
            Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR)
        }
        _ => Decimal::ZERO,
    }
}

/// Cost of a reading history under `plan`, priced at `at`.
///
/// `(average / elapsed_hours) * plan.price_at(at)`. A history spanning zero
/// time costs zero under every plan.
pub fn calculate_cost(
    readings: &[ElectricityReading],
    plan: &PricePlan,
    at: NaiveDateTime,
) -> Decimal {
    let elapsed = elapsed_hours(readings);
    if elapsed.is_zero() {
        return Decimal::ZERO;
    }

    let Some(average) = average_reading(readings) else {
        return Decimal::ZERO;
    };

    let unit_price = plan.price_at(at);
    match divide_half_up(average, elapsed).and_then(|rate| rate.checked_mul(unit_price)) {
        Some(cost) => cost,
        None => {
            warn!(
                price_plan_id = %plan.id,
                average = %average,
                elapsed_hours = %elapsed,
                "Cost calculation overflowed, reporting zero"
            );
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_728_000_000 + secs, 0).unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_average_keeps_dividend_scale() {
        let readings = vec![
            ElectricityReading::new(ts(0), dec!(15.0)),
            ElectricityReading::new(ts(3600), dec!(5.0)),
        ];
        let average = average_reading(&readings).unwrap();
        assert_eq!(average, dec!(10.0));
        assert_eq!(average.scale(), 1);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let readings = vec![
            ElectricityReading::new(ts(0), dec!(1)),
            ElectricityReading::new(ts(1), dec!(2)),
        ];
        // 3 / 2 = 1.5 at scale 0
        assert_eq!(average_reading(&readings).unwrap(), dec!(2));
    }

    #[test]
    fn test_average_of_empty_is_none() {
        assert!(average_reading(&[]).is_none());
    }

    #[test]
    fn test_elapsed_hours_ignores_storage_order() {
        let readings = vec![
            ElectricityReading::new(ts(1800), dec!(1)),
            ElectricityReading::new(ts(7200), dec!(1)),
            ElectricityReading::new(ts(0), dec!(1)),
        ];
        assert_eq!(elapsed_hours(&readings), dec!(2));
    }

    #[test]
    fn test_cost_for_single_reading_is_zero() {
        let plan = PricePlan::new("p", "s", dec!(10));
        let readings = vec![ElectricityReading::new(ts(0), dec!(3.5))];
        assert_eq!(calculate_cost(&readings, &plan, now()), Decimal::ZERO);
    }

    #[test]
    fn test_cost_for_shared_timestamp_is_zero() {
        let plan = PricePlan::new("p", "s", dec!(10));
        let readings = vec![
            ElectricityReading::new(ts(0), dec!(3.5)),
            ElectricityReading::new(ts(0), dec!(1.5)),
        ];
        assert_eq!(calculate_cost(&readings, &plan, now()), Decimal::ZERO);
    }

    #[test]
    fn test_cost_one_hour_window() {
        let plan = PricePlan::new("p", "s", dec!(10));
        let readings = vec![
            ElectricityReading::new(ts(0), dec!(15.0)),
            ElectricityReading::new(ts(3600), dec!(5.0)),
        ];
        assert_eq!(calculate_cost(&readings, &plan, now()), dec!(100.0));
    }

    #[test]
    fn test_cost_half_hour_window() {
        let plan = PricePlan::new("p", "s", dec!(2));
        let readings = vec![
            ElectricityReading::new(ts(0), dec!(0.40)),
            ElectricityReading::new(ts(1800), dec!(0.60)),
        ];
        // average 0.50, / 0.5h = 1.00, * 2
        assert_eq!(calculate_cost(&readings, &plan, now()), dec!(2.00));
    }
}

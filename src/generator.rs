//! Synthetic electricity readings for seeding and demos

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::ElectricityReading;

const READING_SCALE: u32 = 4;

#[derive(Debug, Clone, Copy)]
pub struct ReadingsGenerator {
    interval: TimeDelta,
}

impl ReadingsGenerator {
    pub fn new(interval: TimeDelta) -> Self {
        Self { interval }
    }

    /// `count` readings spaced `interval` apart and ending at `end`, oldest first
    ///
    /// Stops early once a timestamp would fall outside the representable range.
    pub fn generate(&self, count: usize, end: DateTime<Utc>) -> Vec<ElectricityReading> {
        self.generate_with(&mut rand::thread_rng(), count, end)
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
        end: DateTime<Utc>,
    ) -> Vec<ElectricityReading> {
        let mut readings: Vec<ElectricityReading> = (0..count)
            .map_while(|i| {
                let offset = self.interval.checked_mul(i32::try_from(i).ok()?)?;
                let time = end.checked_sub_signed(offset)?;
                Some(ElectricityReading::new(time, positive_reading(rng)))
            })
            .collect();

        readings.sort_by_key(|r| r.time);
        readings
    }
}

impl Default for ReadingsGenerator {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(10))
    }
}

/// |N(0, 1)| rounded up to four decimal places
fn positive_reading<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    // Box-Muller; 1 - u keeps the log argument in (0, 1]
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let gaussian = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();

    Decimal::from_f64(gaussian.abs())
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(READING_SCALE, RoundingStrategy::ToPositiveInfinity)
}

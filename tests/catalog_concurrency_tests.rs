/// Integration tests for concurrent peak multiplier updates on the catalog
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use joi_energy::{
    models::{DayOfWeek, ElectricityReading, PeakTimeMultiplier, PeriodType, PricePlan},
    pricing::{PricePlanCatalog, PricingEngine},
    store::ReadingStore,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const WRITERS: usize = 8;
const RULES_PER_WRITER: usize = 25;

fn day(h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_709_251_200 + secs, 0).unwrap()
}

/// Friday rule whose multiplier encodes the writer and its sequence number
fn rule(writer: usize, index: usize) -> PeakTimeMultiplier {
    friday_rule(Decimal::from((writer * 1000 + index + 1) as i64))
}

fn friday_rule(multiplier: Decimal) -> PeakTimeMultiplier {
    PeakTimeMultiplier {
        period: PeriodType::Peak,
        day_of_week: DayOfWeek::Friday,
        multiplier,
        start_date_time: day(0),
        end_date_time: day(23),
    }
}

fn catalog() -> Arc<PricePlanCatalog> {
    Arc::new(PricePlanCatalog::new(vec![
        PricePlan::new("A", "Supplier A", dec!(10)),
        PricePlan::new("B", "Supplier B", dec!(1)),
        PricePlan::new("C", "Supplier C", dec!(2)),
    ]))
}

/// Sequence numbers per writer in list order; every prefix must be 1..=n
fn assert_writer_prefixes(rules: &[PeakTimeMultiplier]) {
    let mut seen = vec![0i64; WRITERS];
    for rule in rules {
        let encoded = rule.multiplier.to_i64().unwrap();
        let writer = (encoded / 1000) as usize;
        let index = encoded % 1000;
        assert_eq!(index, seen[writer] + 1, "writer {} skipped a rule", writer);
        seen[writer] = index;
    }
}

#[test]
fn test_concurrent_rule_adds_to_one_plan_lose_nothing() {
    let catalog = catalog();
    let done = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let catalog = catalog.clone();
            thread::spawn(move || {
                for index in 0..RULES_PER_WRITER {
                    assert!(catalog.add_peak_multiplier("B", rule(writer, index)));
                }
            })
        })
        .collect();

    let reader = {
        let catalog = catalog.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut last_len = 0;
            while !done.load(Ordering::Acquire) {
                let snapshot = catalog.snapshot();
                assert_eq!(snapshot.len(), 3);

                let rules = &snapshot[1].peak_time_multipliers;
                assert!(rules.len() >= last_len);
                assert_writer_prefixes(rules);
                last_len = rules.len();

                assert!(snapshot[0].peak_time_multipliers.is_empty());
                assert!(snapshot[2].peak_time_multipliers.is_empty());
            }
        })
    };

    for handle in writers {
        handle.join().unwrap();
    }
    done.store(true, Ordering::Release);
    reader.join().unwrap();

    let plan = catalog.get("B").unwrap();
    assert_eq!(plan.peak_time_multipliers.len(), WRITERS * RULES_PER_WRITER);
    assert_writer_prefixes(&plan.peak_time_multipliers);
    for writer in 0..WRITERS {
        for index in 0..RULES_PER_WRITER {
            assert!(plan.peak_time_multipliers.contains(&rule(writer, index)));
        }
    }
}

#[test]
fn test_compare_all_racing_rule_adds_sees_whole_lists() {
    let store = Arc::new(ReadingStore::new());
    let catalog = catalog();
    let engine = Arc::new(PricingEngine::new(store.clone(), catalog.clone()));
    store
        .append(
            "m",
            vec![
                ElectricityReading::new(ts(0), dec!(15.0)),
                ElectricityReading::new(ts(3600), dec!(5.0)),
            ],
        )
        .unwrap();

    let done = Arc::new(AtomicBool::new(false));

    // Re-adding an equal rule moves it last, so the first match flips
    // between the two rules
    let writer = {
        let catalog = catalog.clone();
        thread::spawn(move || {
            for i in 0..200 {
                let multiplier = if i % 2 == 0 { dec!(3) } else { dec!(5) };
                catalog.add_peak_multiplier("B", friday_rule(multiplier));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            let done = done.clone();
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    let costs = engine.compare_all_at("m", day(12)).unwrap();
                    assert_eq!(costs.len(), 3);
                    assert_eq!(costs["A"], dec!(100.0));
                    assert_eq!(costs["C"], dec!(20.0));
                    assert!(
                        [dec!(10.0), dec!(30.0), dec!(50.0)].contains(&costs["B"]),
                        "unexpected cost {}",
                        costs["B"]
                    );
                }
            })
        })
        .collect();

    writer.join().unwrap();
    done.store(true, Ordering::Release);
    for handle in readers {
        handle.join().unwrap();
    }

    let plan = catalog.get("B").unwrap();
    assert_eq!(plan.peak_time_multipliers.len(), 2);
    // The last add was the 5x rule, so the 3x rule now matches first
    let costs = engine.compare_all_at("m", day(12)).unwrap();
    assert_eq!(costs["B"], dec!(30.0));
}

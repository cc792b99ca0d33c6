use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::pricing::calculator::calculate_cost;
use crate::pricing::catalog::PricePlanCatalog;
use crate::store::ReadingStore;

/// Cost of a meter's history under each plan, keyed by plan id
pub type CostResult = BTreeMap<String, Decimal>;

/// One ranked entry of a recommendation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCost {
    pub price_plan_id: String,
    pub cost: Decimal,
}

/// Derives per-plan cost and cheapest-plan rankings from stored readings
pub struct PricingEngine {
    store: Arc<ReadingStore>,
    catalog: Arc<PricePlanCatalog>,
}

impl PricingEngine {
    pub fn new(store: Arc<ReadingStore>, catalog: Arc<PricePlanCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Cost under every known plan, priced at the current local time.
    ///
    /// `None` when the meter has no readings.
    pub fn compare_all(&self, meter_id: &str) -> Option<CostResult> {
        self.compare_all_at(meter_id, Local::now().naive_local())
    }

    /// Cost under every known plan, priced at `at`
    pub fn compare_all_at(&self, meter_id: &str, at: NaiveDateTime) -> Option<CostResult> {
        let readings = self.store.get(meter_id)?;
        let plans = self.catalog.snapshot();

        let costs: CostResult = plans
            .iter()
            .map(|plan| (plan.id.clone(), calculate_cost(&readings, plan, at)))
            .collect();

        debug!(
            meter_id = %meter_id,
            readings = readings.len(),
            plans = costs.len(),
            "Compared price plans"
        );
        Some(costs)
    }

    /// Plans ranked by ascending cost, ties broken by plan id.
    ///
    /// `limit` truncates the ranking; `None` or a limit at least as large as
    /// the plan count returns every plan.
    pub fn recommend(&self, meter_id: &str, limit: Option<usize>) -> Option<Vec<PlanCost>> {
        self.recommend_at(meter_id, limit, Local::now().naive_local())
    }

    pub fn recommend_at(
        &self,
        meter_id: &str,
        limit: Option<usize>,
        at: NaiveDateTime,
    ) -> Option<Vec<PlanCost>> {
        let costs = self.compare_all_at(meter_id, at)?;
        Some(rank(costs, limit))
    }
}

fn rank(costs: CostResult, limit: Option<usize>) -> Vec<PlanCost> {
    let mut ranked: Vec<PlanCost> = costs
        .into_iter()
        .map(|(price_plan_id, cost)| PlanCost {
            price_plan_id,
            cost,
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.cost
            .cmp(&b.cost)
            .then_with(|| a.price_plan_id.cmp(&b.price_plan_id))
    });

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::metrics;
use crate::models::{PeakTimeMultiplier, PricePlan};

/// Shared list of price plans with copy-on-write updates
///
/// Readers take a snapshot of the whole list; administrative updates build a
/// new list and swap it in atomically, so an in-flight comparison sees either
/// the old or the new rule list of a plan, never a partial one.
pub struct PricePlanCatalog {
    plans: ArcSwap<Vec<Arc<PricePlan>>>,
}

impl PricePlanCatalog {
    pub fn new(plans: Vec<PricePlan>) -> Self {
        let plans = plans.into_iter().map(Arc::new).collect::<Vec<_>>();
        Self {
            plans: ArcSwap::from_pointee(plans),
        }
    }

    /// Consistent point-in-time view of every plan, in catalog order
    pub fn snapshot(&self) -> Arc<Vec<Arc<PricePlan>>> {
        self.plans.load_full()
    }

    pub fn get(&self, plan_id: &str) -> Option<Arc<PricePlan>> {
        self.plans
            .load()
            .iter()
            .find(|plan| plan.id == plan_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.plans.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.load().is_empty()
    }

    /// Add `rule` to the plan named `plan_id`.
    ///
    /// An existing equal rule is removed first, so re-adding a rule moves it
    /// to the end of the list. Unknown plan ids are ignored; the return value
    /// only tells whether the rule was applied.
    pub fn add_peak_multiplier(&self, plan_id: &str, rule: PeakTimeMultiplier) -> bool {
        let mut applied = false;

        self.plans.rcu(|current| {
            applied = false;
            let mut next = Vec::with_capacity(current.len());
            for plan in current.iter() {
                if !applied && plan.id == plan_id {
                    let mut updated = PricePlan::clone(plan);
                    updated.upsert_peak_time_multiplier(rule.clone());
                    next.push(Arc::new(updated));
                    applied = true;
                } else {
                    next.push(Arc::clone(plan));
                }
            }
            next
        });

        if applied {
            metrics::record_peak_multiplier(Some(plan_id));
            debug!(
                price_plan_id = %plan_id,
                day_of_week = ?rule.day_of_week,
                multiplier = %rule.multiplier,
                "Added peak time multiplier"
            );
        } else {
            metrics::record_peak_multiplier(None);
            warn!(
                price_plan_id = %plan_id,
                "Ignoring peak time multiplier for unknown price plan"
            );
        }

        applied
    }
}

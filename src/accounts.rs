use std::collections::HashMap;

use crate::config::AccountConfig;

/// Maps smart meter ids to the price plan the customer is currently on
#[derive(Debug, Clone, Default)]
pub struct AccountService {
    smart_meter_to_price_plan: HashMap<String, String>,
}

impl AccountService {
    pub fn new(accounts: &[AccountConfig]) -> Self {
        let smart_meter_to_price_plan = accounts
            .iter()
            .map(|a| (a.smart_meter_id.clone(), a.price_plan_id.clone()))
            .collect();
        Self {
            smart_meter_to_price_plan,
        }
    }

    pub fn price_plan_for(&self, smart_meter_id: &str) -> Option<&str> {
        self.smart_meter_to_price_plan
            .get(smart_meter_id)
            .map(String::as_str)
    }

    pub fn smart_meter_ids(&self) -> impl Iterator<Item = &str> {
        self.smart_meter_to_price_plan.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.smart_meter_to_price_plan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.smart_meter_to_price_plan.is_empty()
    }
}

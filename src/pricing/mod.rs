pub mod calculator;
pub mod catalog;
pub mod engine;

pub use calculator::calculate_cost;
pub use catalog::PricePlanCatalog;
pub use engine::{CostResult, PlanCost, PricingEngine};

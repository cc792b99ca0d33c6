pub mod health;
pub mod metrics_handler;
pub mod peak_multipliers;
pub mod price_plans;
pub mod readings;

use std::sync::Arc;

use crate::accounts::AccountService;
use crate::pricing::{PricePlanCatalog, PricingEngine};
use crate::store::ReadingStore;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReadingStore>,
    pub catalog: Arc<PricePlanCatalog>,
    pub engine: Arc<PricingEngine>,
    pub accounts: Arc<AccountService>,
}

impl AppState {
    pub fn new(
        store: Arc<ReadingStore>,
        catalog: Arc<PricePlanCatalog>,
        accounts: Arc<AccountService>,
    ) -> Self {
        let engine = Arc::new(PricingEngine::new(store.clone(), catalog.clone()));
        Self {
            store,
            catalog,
            engine,
            accounts,
        }
    }
}

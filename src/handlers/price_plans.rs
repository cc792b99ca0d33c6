use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{error::AppError, handlers::AppState, pricing::CostResult};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanComparisonResponse {
    /// Plan the meter's account is currently on, if it has one
    pub price_plan_id: Option<String>,
    pub price_plan_comparisons: CostResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendParams {
    pub limit: Option<usize>,
}

fn meter_not_found(smart_meter_id: &str) -> AppError {
    AppError::NotFound(format!("No readings for smart meter '{}'", smart_meter_id))
}

/// Handle GET /price-plans/compare-all/:smart_meter_id
pub async fn compare_all(
    State(state): State<AppState>,
    Path(smart_meter_id): Path<String>,
) -> Result<Json<PlanComparisonResponse>, AppError> {
    let costs = state
        .engine
        .compare_all(&smart_meter_id)
        .ok_or_else(|| meter_not_found(&smart_meter_id))?;

    Ok(Json(PlanComparisonResponse {
        price_plan_id: state
            .accounts
            .price_plan_for(&smart_meter_id)
            .map(str::to_string),
        price_plan_comparisons: costs,
    }))
}

/// Handle GET /price-plans/recommend/:smart_meter_id
///
/// Answers a list of single-entry `{planId: cost}` objects, cheapest first.
pub async fn recommend(
    State(state): State<AppState>,
    Path(smart_meter_id): Path<String>,
    params: Result<Query<RecommendParams>, QueryRejection>,
) -> Result<Json<Vec<BTreeMap<String, Decimal>>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let ranked = state
        .engine
        .recommend(&smart_meter_id, params.limit)
        .ok_or_else(|| meter_not_found(&smart_meter_id))?;

    let body = ranked
        .into_iter()
        .map(|entry| BTreeMap::from([(entry.price_plan_id, entry.cost)]))
        .collect();

    Ok(Json(body))
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;

use crate::{error::AppError, handlers::AppState, models::PeakTimeMultiplier};

/// Handle POST /price-plans/:plan_id/peak-multiplier
///
/// Rules are applied in body order. An unknown plan id is accepted and
/// ignored, matching the catalog's no-op semantics.
pub async fn add_peak_multipliers(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    payload: Result<Json<Vec<PeakTimeMultiplier>>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(rules) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    for rule in rules {
        state.catalog.add_peak_multiplier(&plan_id, rule);
    }

    Ok(Json(json!({ "message": "ok" })))
}

/// Handle GET /price-plans/:plan_id/peak-multiplier
pub async fn list_peak_multipliers(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<Vec<PeakTimeMultiplier>>, AppError> {
    let plan = state
        .catalog
        .get(&plan_id)
        .ok_or_else(|| AppError::NotFound(format!("Unknown price plan '{}'", plan_id)))?;

    Ok(Json(plan.peak_time_multipliers.clone()))
}

/// Handle GET /price-plans/peak-multipliers
pub async fn all_peak_multipliers(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, Vec<PeakTimeMultiplier>>> {
    let plans = state.catalog.snapshot();
    Json(
        plans
            .iter()
            .map(|plan| (plan.id.clone(), plan.peak_time_multipliers.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{body_json, create_test_state};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    const FRIDAY_RULE: &str = r#"[{
        "period": "PEAK",
        "dayOfWeek": "FRIDAY",
        "multiplier": 2,
        "startDateTime": "2024-03-01 00:00:00",
        "endDateTime": "2024-03-31 23:59:59"
    }]"#;

    fn app(state: AppState) -> Router {
        Router::new()
            .route(
                "/price-plans/:plan_id/peak-multiplier",
                get(list_peak_multipliers).post(add_peak_multipliers),
            )
            .route("/price-plans/peak-multipliers", get(all_peak_multipliers))
            .with_state(state)
    }

    fn post_rules(plan_id: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/price-plans/{}/peak-multiplier", plan_id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_add_and_list_peak_multiplier() {
        let state = create_test_state();

        let response = app(state.clone())
            .oneshot(post_rules("price-plan-1", FRIDAY_RULE))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "ok");

        let response = app(state.clone())
            .oneshot(get_request("/price-plans/price-plan-1/peak-multiplier"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json[0]["dayOfWeek"], "FRIDAY");
        assert_eq!(json[0]["startDateTime"], "2024-03-01 00:00:00");

        let response = app(state)
            .oneshot(get_request("/price-plans/peak-multipliers"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["price-plan-1"].as_array().unwrap().len(), 1);
        assert!(json["price-plan-0"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_to_unknown_plan_is_accepted_and_ignored() {
        let state = create_test_state();

        let response = app(state.clone())
            .oneshot(post_rules("price-plan-9", FRIDAY_RULE))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        for plan in state.catalog.snapshot().iter() {
            assert!(plan.peak_time_multipliers.is_empty());
        }

        let response = app(state)
            .oneshot(get_request("/price-plans/price-plan-9/peak-multiplier"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_rejects_malformed_window() {
        let body = FRIDAY_RULE.replace("2024-03-01 00:00:00", "yesterday");
        let response = app(create_test_state())
            .oneshot(post_rules("price-plan-1", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

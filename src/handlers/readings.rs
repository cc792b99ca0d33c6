use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppError,
    handlers::AppState,
    models::{ElectricityReading, MeterReadings},
};

/// Handle POST /readings/store
///
/// Nothing is stored unless the whole request is valid.
pub async fn store_readings(
    State(state): State<AppState>,
    payload: Result<Json<MeterReadings>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let meter_id = request
        .smart_meter_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidInput("smartMeterId is required".to_string()))?;
    let readings = request
        .electricity_readings
        .filter(|readings| !readings.is_empty())
        .ok_or_else(|| {
            AppError::InvalidInput("electricityReadings must not be empty".to_string())
        })?;

    state.store.append(&meter_id, readings)?;

    Ok(StatusCode::OK)
}

/// Handle GET /readings/read/:smart_meter_id
pub async fn read_readings(
    State(state): State<AppState>,
    Path(smart_meter_id): Path<String>,
) -> Result<Json<Vec<ElectricityReading>>, AppError> {
    let series = state.store.get(&smart_meter_id).ok_or_else(|| {
        AppError::NotFound(format!("No readings for smart meter '{}'", smart_meter_id))
    })?;

    Ok(Json(series.to_vec()))
}

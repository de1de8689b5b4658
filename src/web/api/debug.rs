use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::ingest::{HourProbe, MAX_WINDOW_HOURS};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DebugHourParams {
    /// Upstream hour file to probe, "00".."23"; defaults to "00".
    pub hh: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/debug/hour",
    params(DebugHourParams),
    responses(
        (status = 200, description = "Raw upstream response diagnostics", body = HourProbe),
        (status = 400, description = "Invalid hour", body = ErrorResponse)
    ),
    tag = "debug"
)]
pub async fn debug_hour(
    State(state): State<AppState>,
    Query(params): Query<DebugHourParams>,
) -> ApiResult<Json<HourProbe>> {
    let hh = params.hh.as_deref().unwrap_or("00");
    let hour: u32 = hh
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("not an hour: {hh}")))?;
    if hour >= MAX_WINDOW_HOURS {
        return Err(ApiError::Validation(format!("hour out of range: {hour}")));
    }

    let probe = state
        .upstream
        .probe_hour(hour)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    Ok(Json(probe))
}

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::ingest::PositionReport;
use crate::stitch::{midpoint, path_length_m, stitch};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;
use crate::wind::{WindQuery, WindSample};

const DEFAULT_PRESSURE_HPA: u32 = 700;

#[derive(Debug, Deserialize, IntoParams)]
pub struct WindParams {
    pub lat: f64,
    pub lon: f64,
    /// Target instant, RFC 3339; defaults to now.
    pub t: Option<DateTime<Utc>>,
    /// Pressure level in hPa for the first resolution tier.
    pub pressure: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WindResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<WindSample>,
}

#[utoipa::path(
    get,
    path = "/api/wind",
    params(WindParams),
    responses(
        (status = 200, description = "Best-effort wind vector; ok=false when neither tier had usable data", body = WindResponse),
        (status = 400, description = "lat and lon must be finite", body = ErrorResponse)
    ),
    tag = "wind"
)]
pub async fn wind(
    State(state): State<AppState>,
    Query(params): Query<WindParams>,
) -> ApiResult<Json<WindResponse>> {
    if !params.lat.is_finite() || !params.lon.is_finite() {
        return Err(ApiError::Validation("lat and lon required".into()));
    }

    let query = WindQuery {
        lat: params.lat,
        lon: params.lon,
        when: params.t.unwrap_or_else(Utc::now),
        pressure_hpa: params.pressure.unwrap_or(DEFAULT_PRESSURE_HPA),
    };
    let sample = state.wind.resolve(&query).await;

    Ok(Json(WindResponse {
        ok: sample.is_some(),
        wind: sample,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TrackWindsParams {
    /// Pressure level in hPa for the first resolution tier.
    pub pressure: Option<u32>,
    /// Cap on sampled tracks, longest path first.
    pub max_tracks: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackWind {
    pub id: String,
    /// The representative report the wind was resolved at (temporal midpoint).
    pub at: PositionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<WindSample>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackWindsResponse {
    pub ok: bool,
    pub data: Vec<TrackWind>,
}

#[utoipa::path(
    get,
    path = "/api/wind/tracks",
    params(TrackWindsParams),
    responses(
        (status = 200, description = "Wind at each reconstructed track's midpoint", body = TrackWindsResponse)
    ),
    tag = "wind"
)]
pub async fn track_winds(
    State(state): State<AppState>,
    Query(params): Query<TrackWindsParams>,
) -> ApiResult<Json<TrackWindsResponse>> {
    let frames = state
        .upstream
        .fetch_window(state.config.upstream.window_hours)
        .await;
    let tracks = stitch(&frames);

    let mut ranked: Vec<(String, &Vec<PositionReport>)> = tracks
        .iter()
        .map(|(id, reports)| (id.clone(), reports))
        .collect();
    ranked.sort_by(|a, b| path_length_m(b.1).total_cmp(&path_length_m(a.1)));
    ranked.truncate(params.max_tracks.unwrap_or(50));

    let pressure_hpa = params.pressure.unwrap_or(DEFAULT_PRESSURE_HPA);
    let mut entries = Vec::new();
    let mut queries = Vec::new();
    for (id, reports) in &ranked {
        if let Some(point) = midpoint(reports) {
            entries.push((id.clone(), point.clone()));
            queries.push(WindQuery {
                lat: point.lat,
                lon: point.lon,
                when: point.t,
                pressure_hpa,
            });
        }
    }

    let samples = Arc::clone(&state.wind)
        .resolve_many(queries, state.config.wind.concurrency)
        .await;

    let data: Vec<TrackWind> = entries
        .into_iter()
        .zip(samples)
        .map(|((id, at), wind)| TrackWind { id, at, wind })
        .collect();

    Ok(Json(TrackWindsResponse { ok: true, data }))
}

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::ingest::PositionReport;
use crate::stitch::{path_length_m, segment_speeds, simplify, stitch, SpeedBand};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct TelemetryQuery {
    /// Cap on returned tracks, longest simplified path first.
    #[serde(default = "default_max_tracks")]
    pub max_tracks: usize,
    /// Minimum segment count a track must retain after simplification.
    #[serde(default = "default_min_segments")]
    pub min_segments: usize,
    /// Vertex thinning threshold in meters; 0 keeps every report.
    #[serde(default = "default_simplify_m")]
    pub simplify_m: f64,
    /// Segments implying a higher speed than this are not returned.
    #[serde(default = "default_max_speed_ms")]
    pub max_speed_ms: f64,
}

fn default_max_tracks() -> usize {
    150
}

fn default_min_segments() -> usize {
    3
}

fn default_simplify_m() -> f64 {
    25_000.0
}

fn default_max_speed_ms() -> f64 {
    100.0
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SegmentView {
    pub from: usize,
    pub to: usize,
    pub speed_ms: f64,
    pub band: SpeedBand,
    pub color: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackView {
    pub id: String,
    /// Total simplified path length, meters. Tracks are ranked by this.
    pub length_m: f64,
    pub points: Vec<PositionReport>,
    pub segments: Vec<SegmentView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TelemetryResponse {
    pub ok: bool,
    /// Reconstructed track count before ranking/truncation.
    pub tracks: usize,
    /// Report count across all reconstructed tracks.
    pub points: usize,
    pub data: Vec<TrackView>,
}

#[utoipa::path(
    get,
    path = "/api/telemetry",
    params(TelemetryQuery),
    responses(
        (status = 200, description = "Reconstructed tracks for the current window", body = TelemetryResponse),
        (status = 400, description = "Invalid query parameter", body = ErrorResponse)
    ),
    tag = "telemetry"
)]
pub async fn telemetry(
    State(state): State<AppState>,
    Query(query): Query<TelemetryQuery>,
) -> ApiResult<Json<TelemetryResponse>> {
    if !query.simplify_m.is_finite() || query.simplify_m < 0.0 {
        return Err(ApiError::Validation("simplify_m must be >= 0".into()));
    }

    let frames = state
        .upstream
        .fetch_window(state.config.upstream.window_hours)
        .await;
    let tracks = stitch(&frames);
    let total_points: usize = tracks.values().map(Vec::len).sum();
    log::info!("telemetry: balloons={} points={}", tracks.len(), total_points);

    let mut views: Vec<TrackView> = tracks
        .iter()
        .map(|(id, reports)| {
            let thinned = simplify(reports, query.simplify_m);
            let length_m = path_length_m(&thinned);
            let segments = segment_speeds(&thinned)
                .into_iter()
                .filter(|s| s.speed_ms <= query.max_speed_ms)
                .map(|s| {
                    let band = SpeedBand::for_speed(s.speed_ms);
                    SegmentView {
                        from: s.from,
                        to: s.to,
                        speed_ms: s.speed_ms,
                        band,
                        color: band.color().to_string(),
                    }
                })
                .collect();
            TrackView {
                id: id.clone(),
                length_m,
                points: thinned,
                segments,
            }
        })
        .filter(|view| view.points.len() > query.min_segments)
        .collect();

    views.sort_by(|a, b| b.length_m.total_cmp(&a.length_m));
    views.truncate(query.max_tracks);

    Ok(Json(TelemetryResponse {
        ok: true,
        tracks: tracks.len(),
        points: total_points,
        data: views,
    }))
}

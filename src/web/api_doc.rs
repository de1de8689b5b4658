use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::telemetry::{SegmentView, TelemetryResponse, TrackView};
use super::api::wind::{TrackWind, TrackWindsResponse, WindResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::telemetry::telemetry,
        super::api::wind::wind,
        super::api::wind::track_winds,
        super::api::debug::debug_hour,
    ),
    components(
        schemas(
            TelemetryResponse,
            TrackView,
            SegmentView,
            WindResponse,
            TrackWind,
            TrackWindsResponse,
            ErrorResponse,
            crate::ingest::PositionReport,
            crate::ingest::HourProbe,
            crate::stitch::SpeedBand,
            crate::wind::WindSample,
        )
    ),
    info(
        title = "Balloon Tracks API",
        description = "Trajectory reconstruction over hourly constellation snapshots, with tiered wind lookups",
        version = "0.1.0"
    ),
    tags(
        (name = "telemetry", description = "Track reconstruction"),
        (name = "wind", description = "Wind vector resolution"),
        (name = "debug", description = "Upstream diagnostics")
    )
)]
pub struct ApiDoc;

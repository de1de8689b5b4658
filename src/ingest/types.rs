use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// One normalized upstream position report. Timestamps are always absolute;
/// the normalizer manufactures them from the hour's age when the raw payload
/// carries none.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PositionReport {
    pub t: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
}

/// One hour's snapshot of position reports.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Hours before "now" this frame was collected (0 = most recent).
    pub age_hours: u32,
    pub reports: Vec<PositionReport>,
}

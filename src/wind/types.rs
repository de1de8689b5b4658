use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A resolved wind vector, derived fresh per query and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WindSample {
    /// Eastward component, m/s.
    pub u_ms: f64,
    /// Northward component, m/s.
    pub v_ms: f64,
    pub speed_ms: f64,
    /// Meteorological bearing the wind blows FROM, degrees [0, 360).
    pub direction_deg: f64,
    pub t: DateTime<Utc>,
    /// Dataset level the sample came from, e.g. "700hPa" or "10m".
    pub level: String,
}

/// One point-in-time wind lookup.
#[derive(Debug, Clone, Copy)]
pub struct WindQuery {
    pub lat: f64,
    pub lon: f64,
    pub when: DateTime<Utc>,
    pub pressure_hpa: u32,
}

/// Hourly u/v component series as returned by one dataset tier. Missing
/// values are carried as NaN so nearest-index selection can reject them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindSeries {
    pub times: Vec<DateTime<Utc>>,
    pub u_ms: Vec<f64>,
    pub v_ms: Vec<f64>,
}

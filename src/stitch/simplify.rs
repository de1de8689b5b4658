//! Track geometry reduction and per-segment speed annotation.

use serde::Serialize;
use utoipa::ToSchema;

use crate::geo::haversine;
use crate::ingest::PositionReport;

/// Speed-annotated view over two adjacent reports of one track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
    pub speed_ms: f64,
}

/// Presentation band for a segment speed. Pure classification; thresholds and
/// colors are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBand {
    Calm,
    Moderate,
    Brisk,
    Fast,
}

impl SpeedBand {
    pub fn for_speed(speed_ms: f64) -> Self {
        if speed_ms < 5.0 {
            SpeedBand::Calm
        } else if speed_ms < 15.0 {
            SpeedBand::Moderate
        } else if speed_ms < 30.0 {
            SpeedBand::Brisk
        } else {
            SpeedBand::Fast
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SpeedBand::Calm => "#4CAF50",
            SpeedBand::Moderate => "#FFC107",
            SpeedBand::Brisk => "#FF9800",
            SpeedBand::Fast => "#F44336",
        }
    }
}

/// Greedy single-pass vertex thinning: the first report is always kept, each
/// later report only if it sits at least `min_distance_m` from the last kept
/// one. Produces a subsequence; never reorders or synthesizes points. The
/// final report gets no special treatment.
pub fn simplify(reports: &[PositionReport], min_distance_m: f64) -> Vec<PositionReport> {
    let Some(first) = reports.first() else {
        return Vec::new();
    };
    let mut kept = vec![first.clone()];
    for report in &reports[1..] {
        let last = &kept[kept.len() - 1];
        if haversine(last.lat, last.lon, report.lat, report.lon) >= min_distance_m {
            kept.push(report.clone());
        }
    }
    kept
}

/// Speed of each adjacent pair. Unlike the stitcher's eligibility check, the
/// elapsed time here is the true value with no one-hour floor; pairs with
/// zero or negative elapsed time are skipped rather than emitted.
pub fn segment_speeds(reports: &[PositionReport]) -> Vec<Segment> {
    let mut out = Vec::new();
    for i in 1..reports.len() {
        let a = &reports[i - 1];
        let b = &reports[i];
        let elapsed_s = (b.t - a.t).num_milliseconds() as f64 / 1000.0;
        if elapsed_s <= 0.0 {
            continue;
        }
        let d = haversine(a.lat, a.lon, b.lat, b.lon);
        out.push(Segment {
            from: i - 1,
            to: i,
            speed_ms: d / elapsed_s,
        });
    }
    out
}

/// Total great-circle length of a polyline, used to rank tracks when the
/// caller caps how many it renders.
pub fn path_length_m(reports: &[PositionReport]) -> f64 {
    reports
        .windows(2)
        .map(|w| haversine(w[0].lat, w[0].lon, w[1].lat, w[1].lon))
        .sum()
}

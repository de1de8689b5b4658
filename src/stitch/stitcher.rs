//! Greedy trajectory stitching. Upstream reports carry no persistent object
//! identifier, so continuity is reconstructed by constrained nearest-neighbor
//! assignment: each report joins the closest existing track whose implied
//! motion stays physically plausible, or starts a new one.
//!
//! The matching is deliberately greedy and order-dependent (a report can take
//! the nearest track away from a report later in the same frame). That is the
//! compatibility behavior; it is not a bug to optimize away.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use crate::geo::haversine;
use crate::ingest::{Frame, PositionReport};

/// Hard cap on plausible balloon ground speed.
pub const MAX_SPEED_MS: f64 = 80.0;

/// Absolute displacement cap per hour of elapsed time.
pub const MAX_JUMP_PER_HOUR_M: f64 = 400_000.0;

struct TrackBuilder {
    id: String,
    reports: Vec<PositionReport>,
}

/// Reconstruct identity-stable tracks from hourly frames.
///
/// `frames` is ordered newest-first (age 0 first); processing runs oldest to
/// newest so appended reports always increase in time, including when hours
/// are missing from the window. Tracks that never reach two reports are
/// dropped. Same input, same output: the whole pass is pure.
pub fn stitch(frames: &[Frame]) -> BTreeMap<String, Vec<PositionReport>> {
    let mut tracks: Vec<TrackBuilder> = Vec::new();
    let mut next_id = 1u32;

    for frame in frames.iter().rev() {
        // Tracks matched (or created) this frame; reset each frame so the
        // one-report-per-frame rule never leaks across hours.
        let mut claimed: HashSet<usize> = HashSet::new();

        for report in &frame.reports {
            // Non-finite coordinates are a normalizer contract breach.
            debug_assert!(report.lat.is_finite() && report.lon.is_finite());

            let mut best: Option<(usize, f64)> = None;
            for (k, track) in tracks.iter().enumerate() {
                if claimed.contains(&k) {
                    continue;
                }
                let Some(last) = track.reports.last() else {
                    continue;
                };
                // Clamp elapsed time at one hour so near-coincident samples
                // do not blow up the implied speed.
                let dt_hours = elapsed_hours(last.t, report.t).abs().max(1.0);
                let d = haversine(last.lat, last.lon, report.lat, report.lon);
                let speed = d / (dt_hours * 3600.0);
                let jump_limit = MAX_JUMP_PER_HOUR_M * dt_hours;

                // Must satisfy both the speed cap and the absolute jump limit;
                // strict < keeps the first candidate on exact distance ties.
                if speed <= MAX_SPEED_MS
                    && d <= jump_limit
                    && best.map_or(true, |(_, best_d)| d < best_d)
                {
                    best = Some((k, d));
                }
            }

            match best {
                Some((k, _)) => {
                    tracks[k].reports.push(report.clone());
                    claimed.insert(k);
                }
                None => {
                    let id = format!("b{next_id}");
                    next_id += 1;
                    tracks.push(TrackBuilder {
                        id,
                        reports: vec![report.clone()],
                    });
                    // A freshly created track is this frame's assignment too.
                    claimed.insert(tracks.len() - 1);
                }
            }
        }
    }

    let mut out = BTreeMap::new();
    for mut track in tracks {
        // Single-point tracks cannot render a segment; drop them.
        if track.reports.len() < 2 {
            continue;
        }
        track.reports.sort_by_key(|r| r.t);
        out.insert(track.id, track.reports);
    }
    out
}

/// Temporal midpoint report of a track, the representative point used when
/// sampling external data (e.g. wind) once per track.
pub fn midpoint(reports: &[PositionReport]) -> Option<&PositionReport> {
    reports.get(reports.len() / 2)
}

fn elapsed_hours(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (a - b).num_milliseconds() as f64 / 3_600_000.0
}

//! Heuristic normalization of arbitrarily-shaped upstream JSON into position
//! reports. The upstream has been observed to serve bare coordinate tuples,
//! arrays of objects, and wrapped/keyed variants of both; all are accepted.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::types::PositionReport;

/// Extract position reports from one hour's raw payload. Reports with a
/// missing or non-finite coordinate are dropped here so the stitcher never
/// sees them. `t` is the manufactured absolute timestamp for this hour.
pub fn normalize(payload: &Value, t: DateTime<Utc>) -> Vec<PositionReport> {
    match payload {
        Value::Array(items) => {
            // Bare tuples: [[lat, lon, alt?], ...]
            if items.first().is_some_and(Value::is_array) {
                items.iter().filter_map(|item| tuple_report(item, t)).collect()
            } else {
                items.iter().filter_map(|item| object_report(item, t)).collect()
            }
        }
        Value::Object(map) => {
            if let Some(inner) = map.get("data").or_else(|| map.get("balloons")) {
                if inner.is_array() {
                    return normalize(inner, t);
                }
            }
            // Dict of objects keyed by some upstream id we do not trust.
            map.values().filter_map(|item| object_report(item, t)).collect()
        }
        _ => Vec::new(),
    }
}

fn tuple_report(item: &Value, t: DateTime<Utc>) -> Option<PositionReport> {
    let parts = item.as_array()?;
    let lat = to_finite(parts.first()?)?;
    let lon = to_finite(parts.get(1)?)?;
    let alt = parts.get(2).and_then(to_finite);
    Some(PositionReport { t, lat, lon, alt })
}

fn object_report(item: &Value, t: DateTime<Utc>) -> Option<PositionReport> {
    let obj = item.as_object()?;
    let field = |short: &str, long: &str| obj.get(short).or_else(|| obj.get(long));
    let lat = field("lat", "latitude").and_then(to_finite)?;
    let lon = field("lon", "longitude").and_then(to_finite)?;
    let alt = field("alt", "altitude").and_then(to_finite);
    Some(PositionReport { t, lat, lon, alt })
}

/// Lenient numeric coercion: accepts numbers and numeric strings, rejects
/// NaN/infinite values and everything else.
fn to_finite(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

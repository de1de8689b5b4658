//! Open-Meteo hourly wind client: the production implementation of both
//! resolver tiers.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use super::error::WindError;
use super::resolver::TierClient;
use super::types::{WindQuery, WindSeries};
use crate::web::config::WindApiConfig;

#[derive(Clone)]
pub struct OpenMeteoClient {
    http: reqwest::Client,
    base: String,
}

impl OpenMeteoClient {
    pub fn new(config: &WindApiConfig) -> Result<Self, WindError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base: config.base_url.clone(),
        })
    }

    async fn fetch_series(
        &self,
        query: &WindQuery,
        window: (DateTime<Utc>, DateTime<Utc>),
        u_key: &str,
        v_key: &str,
    ) -> Result<WindSeries, WindError> {
        let hour = |t: DateTime<Utc>| t.format("%Y-%m-%dT%H:%M").to_string();
        let payload: Value = self
            .http
            .get(&self.base)
            .query(&[
                ("latitude", query.lat.to_string()),
                ("longitude", query.lon.to_string()),
                ("hourly", format!("{u_key},{v_key}")),
                ("start_hour", hour(window.0)),
                ("end_hour", hour(window.1)),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_series(&payload, u_key, v_key)
    }
}

impl TierClient for OpenMeteoClient {
    fn pressure_level(
        &self,
        query: &WindQuery,
        window: (DateTime<Utc>, DateTime<Utc>),
    ) -> impl Future<Output = Result<WindSeries, WindError>> + Send {
        async move {
            let u_key = format!("u_component_of_wind_{}hPa", query.pressure_hpa);
            let v_key = format!("v_component_of_wind_{}hPa", query.pressure_hpa);
            self.fetch_series(query, window, &u_key, &v_key).await
        }
    }

    fn surface(
        &self,
        query: &WindQuery,
        window: (DateTime<Utc>, DateTime<Utc>),
    ) -> impl Future<Output = Result<WindSeries, WindError>> + Send {
        self.fetch_series(query, window, "u_component_of_wind_10m", "v_component_of_wind_10m")
    }
}

/// Turn an Open-Meteo hourly payload into a [`WindSeries`]. Null readings
/// become NaN (rejected later at selection time); missing arrays or ragged
/// lengths are malformed.
pub fn parse_series(payload: &Value, u_key: &str, v_key: &str) -> Result<WindSeries, WindError> {
    let hourly = payload
        .get("hourly")
        .and_then(Value::as_object)
        .ok_or(WindError::MalformedSeries("missing hourly block"))?;

    let times = hourly
        .get("time")
        .and_then(Value::as_array)
        .ok_or(WindError::MalformedSeries("missing time axis"))?
        .iter()
        .map(|v| v.as_str().and_then(parse_hour))
        .collect::<Option<Vec<_>>>()
        .ok_or(WindError::MalformedSeries("unparseable timestamp"))?;

    let component = |key: &str| -> Result<Vec<f64>, WindError> {
        Ok(hourly
            .get(key)
            .and_then(Value::as_array)
            .ok_or(WindError::MalformedSeries("missing wind component"))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(f64::NAN))
            .collect())
    };
    let u_ms = component(u_key)?;
    let v_ms = component(v_key)?;

    if u_ms.len() != times.len() || v_ms.len() != times.len() {
        return Err(WindError::MalformedSeries("ragged component arrays"));
    }

    Ok(WindSeries { times, u_ms, v_ms })
}

/// Open-Meteo timestamps come without a zone suffix and usually without
/// seconds; both variants are UTC here (the request pins `timezone=UTC`).
fn parse_hour(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_an_hourly_payload_with_nulls_as_nan() {
        let payload = json!({
            "hourly": {
                "time": ["2026-08-30T11:00", "2026-08-30T12:00"],
                "u_component_of_wind_700hPa": [3.5, null],
                "v_component_of_wind_700hPa": [-1.0, 2.0]
            }
        });
        let series =
            parse_series(&payload, "u_component_of_wind_700hPa", "v_component_of_wind_700hPa")
                .unwrap();
        assert_eq!(series.times.len(), 2);
        assert_eq!(series.u_ms[0], 3.5);
        assert!(series.u_ms[1].is_nan());
        assert_eq!(series.times[0], "2026-08-30T11:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn missing_component_array_is_malformed() {
        let payload = json!({
            "hourly": { "time": ["2026-08-30T11:00"], "u_component_of_wind_10m": [1.0] }
        });
        let result = parse_series(&payload, "u_component_of_wind_10m", "v_component_of_wind_10m");
        assert!(matches!(result, Err(WindError::MalformedSeries(_))));
    }

    #[test]
    fn ragged_arrays_are_malformed() {
        let payload = json!({
            "hourly": {
                "time": ["2026-08-30T11:00", "2026-08-30T12:00"],
                "u_component_of_wind_10m": [1.0],
                "v_component_of_wind_10m": [1.0, 2.0]
            }
        });
        let result = parse_series(&payload, "u_component_of_wind_10m", "v_component_of_wind_10m");
        assert!(matches!(result, Err(WindError::MalformedSeries(_))));
    }

    #[test]
    fn non_object_payload_is_malformed() {
        let result = parse_series(&json!([1, 2, 3]), "u", "v");
        assert!(matches!(result, Err(WindError::MalformedSeries(_))));
    }

    #[test]
    fn accepts_timestamps_with_seconds() {
        assert!(parse_hour("2026-08-30T11:00:00").is_some());
        assert!(parse_hour("2026-08-30T11:00").is_some());
        assert!(parse_hour("not a time").is_none());
    }
}

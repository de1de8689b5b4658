//! Tiered wind vector resolution.
//!
//! One query walks a fixed two-step pipeline:
//! `pressure tier -> (usable: return) | surface tier -> (usable: return) | not found`.
//! A tier is usable only when it yields a series with finite u/v components at
//! the nearest-in-time index. No tier is retried and nothing is cached; the
//! surface tier is consulted strictly after the pressure tier fails.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::error::WindError;
use super::types::{WindQuery, WindSample, WindSeries};

/// Inclusive UTC time window covering the calendar day before through the
/// calendar day after `when`, at hourly resolution.
pub fn query_window(when: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = (when.date_naive() - Days::new(1))
        .and_time(NaiveTime::MIN)
        .and_utc();
    // Last hourly sample of the day after: start + 2 days + 23 h.
    (start, start + chrono::Duration::hours(71))
}

/// Index of the series timestamp with minimum absolute distance to `when`.
/// Linear scan; the first minimum wins on exact ties.
pub fn nearest_index(times: &[DateTime<Utc>], when: DateTime<Utc>) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, t) in times.iter().enumerate() {
        let diff = (*t - when).num_milliseconds().abs();
        if best.map_or(true, |(_, best_diff)| diff < best_diff) {
            best = Some((i, diff));
        }
    }
    best.map(|(i, _)| i)
}

/// Pick the nearest-in-time sample out of a tier's series. Returns `None`
/// when the series is empty, ragged, or non-finite at the nearest index;
/// the caller treats that as tier failure.
pub fn sample_at(series: &WindSeries, when: DateTime<Utc>, level: &str) -> Option<WindSample> {
    let i = nearest_index(&series.times, when)?;
    let u = series.u_ms.get(i).copied()?;
    let v = series.v_ms.get(i).copied()?;
    if !u.is_finite() || !v.is_finite() {
        return None;
    }
    Some(WindSample {
        u_ms: u,
        v_ms: v,
        speed_ms: u.hypot(v),
        direction_deg: direction_from_deg(u, v),
        t: series.times[i],
        level: level.to_string(),
    })
}

/// Meteorological "from" bearing of a (u, v) wind vector, degrees [0, 360).
/// The sign convention is user-facing and must not change.
pub fn direction_from_deg(u: f64, v: f64) -> f64 {
    (-u).atan2(-v).to_degrees().rem_euclid(360.0)
}

/// One ranked external wind-data source.
pub trait TierClient: Send + Sync {
    /// Pressure-level reanalysis u/v components for the window.
    fn pressure_level(
        &self,
        query: &WindQuery,
        window: (DateTime<Utc>, DateTime<Utc>),
    ) -> impl Future<Output = Result<WindSeries, WindError>> + Send;

    /// 10 m above-ground u/v components for the window.
    fn surface(
        &self,
        query: &WindQuery,
        window: (DateTime<Utc>, DateTime<Utc>),
    ) -> impl Future<Output = Result<WindSeries, WindError>> + Send;
}

pub struct WindResolver<C> {
    client: C,
}

impl<C: TierClient> WindResolver<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Resolve one point-in-time wind vector, or `None` when both tiers are
    /// unusable. Tier failures never escape as errors.
    pub async fn resolve(&self, query: &WindQuery) -> Option<WindSample> {
        let window = query_window(query.when);
        let level = format!("{}hPa", query.pressure_hpa);

        match self.client.pressure_level(query, window).await {
            Ok(series) => {
                if let Some(sample) = sample_at(&series, query.when, &level) {
                    return Some(sample);
                }
                log::debug!("pressure tier unusable near {}, trying surface", query.when);
            }
            Err(e) => log::debug!("pressure tier query failed: {}", e),
        }

        match self.client.surface(query, window).await {
            Ok(series) => sample_at(&series, query.when, "10m"),
            Err(e) => {
                log::debug!("surface tier query failed: {}", e);
                None
            }
        }
    }

    /// Resolve many independent queries concurrently, at most `limit` in
    /// flight at once. Results come back in input order; each point's tier
    /// fallback still runs sequentially inside its own task.
    pub async fn resolve_many(
        self: Arc<Self>,
        queries: Vec<WindQuery>,
        limit: usize,
    ) -> Vec<Option<WindSample>>
    where
        C: 'static,
    {
        let semaphore = Arc::new(Semaphore::new(limit.max(1)));
        let mut set = JoinSet::new();
        let total = queries.len();

        for (i, query) in queries.into_iter().enumerate() {
            let resolver = Arc::clone(&self);
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (i, resolver.resolve(&query).await)
            });
        }

        let mut out: Vec<Option<WindSample>> = (0..total).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            if let Ok((i, sample)) = joined {
                out[i] = sample;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn t(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn series(times: &[&str], u: &[f64], v: &[f64]) -> WindSeries {
        WindSeries {
            times: times.iter().map(|s| t(s)).collect(),
            u_ms: u.to_vec(),
            v_ms: v.to_vec(),
        }
    }

    struct StubTiers {
        pressure: Option<WindSeries>,
        surface: Option<WindSeries>,
        pressure_calls: AtomicUsize,
        surface_calls: AtomicUsize,
    }

    impl StubTiers {
        fn new(pressure: Option<WindSeries>, surface: Option<WindSeries>) -> Self {
            Self {
                pressure,
                surface,
                pressure_calls: AtomicUsize::new(0),
                surface_calls: AtomicUsize::new(0),
            }
        }
    }

    impl TierClient for StubTiers {
        fn pressure_level(
            &self,
            _query: &WindQuery,
            _window: (DateTime<Utc>, DateTime<Utc>),
        ) -> impl Future<Output = Result<WindSeries, WindError>> + Send {
            self.pressure_calls.fetch_add(1, Ordering::SeqCst);
            let result = self.pressure.clone();
            async move { result.ok_or(WindError::MalformedSeries("stub pressure down")) }
        }

        fn surface(
            &self,
            _query: &WindQuery,
            _window: (DateTime<Utc>, DateTime<Utc>),
        ) -> impl Future<Output = Result<WindSeries, WindError>> + Send {
            self.surface_calls.fetch_add(1, Ordering::SeqCst);
            let result = self.surface.clone();
            async move { result.ok_or(WindError::MalformedSeries("stub surface down")) }
        }
    }

    fn query(when: &str) -> WindQuery {
        WindQuery {
            lat: 10.0,
            lon: 20.0,
            when: t(when),
            pressure_hpa: 700,
        }
    }

    #[test]
    fn window_spans_the_adjacent_utc_calendar_days_inclusive() {
        let (start, end) = query_window(t("2026-08-30T07:45:00Z"));
        assert_eq!(start, t("2026-08-29T00:00:00Z"));
        assert_eq!(end, t("2026-08-31T23:00:00Z"));
    }

    #[test]
    fn nearest_index_prefers_the_first_on_ties() {
        let times = vec![
            t("2026-08-30T10:00:00Z"),
            t("2026-08-30T12:00:00Z"),
            t("2026-08-30T14:00:00Z"),
        ];
        // 13:00 is equidistant from 12:00 and 14:00.
        assert_eq!(nearest_index(&times, t("2026-08-30T13:00:00Z")), Some(1));
        assert_eq!(nearest_index(&times, t("2026-08-30T09:00:00Z")), Some(0));
        assert_eq!(nearest_index(&[], t("2026-08-30T09:00:00Z")), None);
    }

    #[test]
    fn sample_at_rejects_non_finite_components() {
        let s = series(
            &["2026-08-30T11:00:00Z", "2026-08-30T12:00:00Z"],
            &[3.0, f64::NAN],
            &[4.0, 4.0],
        );
        // Nearest to 12:05 is the NaN slot; no earlier-index rescue.
        assert!(sample_at(&s, t("2026-08-30T12:05:00Z"), "700hPa").is_none());
        // Nearest to 11:05 is finite.
        let sample = sample_at(&s, t("2026-08-30T11:05:00Z"), "700hPa").unwrap();
        assert!((sample.speed_ms - 5.0).abs() < 1e-9);
        assert_eq!(sample.level, "700hPa");
    }

    #[test]
    fn sample_at_rejects_ragged_series() {
        let s = series(
            &["2026-08-30T11:00:00Z", "2026-08-30T12:00:00Z"],
            &[3.0],
            &[4.0, 4.0],
        );
        assert!(sample_at(&s, t("2026-08-30T12:00:00Z"), "700hPa").is_none());
    }

    #[test]
    fn direction_is_the_meteorological_from_bearing() {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        // Wind blowing toward the south (v < 0) comes FROM the north.
        assert!(close(direction_from_deg(0.0, -5.0), 0.0));
        // Blowing westward comes from the east.
        assert!(close(direction_from_deg(-5.0, 0.0), 90.0));
        // Blowing northward comes from the south.
        assert!(close(direction_from_deg(0.0, 5.0), 180.0));
        // Blowing eastward comes from the west.
        assert!(close(direction_from_deg(5.0, 0.0), 270.0));
    }

    #[tokio::test]
    async fn pressure_tier_satisfies_without_touching_surface() {
        let stub = StubTiers::new(
            Some(series(&["2026-08-30T12:00:00Z"], &[3.0], &[4.0])),
            Some(series(&["2026-08-30T12:00:00Z"], &[-1.0], &[-1.0])),
        );
        let resolver = WindResolver::new(stub);
        let sample = resolver.resolve(&query("2026-08-30T12:10:00Z")).await.unwrap();
        assert_eq!(sample.level, "700hPa");
        assert_eq!(sample.u_ms, 3.0);
        assert_eq!(resolver.client.pressure_calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.client.surface_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_finite_pressure_components_fall_back_to_surface() {
        let stub = StubTiers::new(
            Some(series(&["2026-08-30T12:00:00Z"], &[f64::NAN], &[4.0])),
            Some(series(&["2026-08-30T13:00:00Z"], &[1.0], &[-1.0])),
        );
        let resolver = WindResolver::new(stub);
        let sample = resolver.resolve(&query("2026-08-30T12:10:00Z")).await.unwrap();
        assert_eq!(sample.level, "10m");
        assert_eq!(sample.u_ms, 1.0);
    }

    #[tokio::test]
    async fn empty_pressure_series_falls_back_to_surface() {
        let stub = StubTiers::new(
            Some(WindSeries::default()),
            Some(series(&["2026-08-30T13:00:00Z"], &[1.0], &[2.0])),
        );
        let resolver = WindResolver::new(stub);
        let sample = resolver.resolve(&query("2026-08-30T12:10:00Z")).await.unwrap();
        assert_eq!(sample.level, "10m");
        assert_eq!(resolver.client.surface_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn both_tiers_failing_is_not_found_not_an_error() {
        let resolver = WindResolver::new(StubTiers::new(None, None));
        assert!(resolver.resolve(&query("2026-08-30T12:10:00Z")).await.is_none());
    }

    #[tokio::test]
    async fn resolve_many_keeps_input_order() {
        let stub = StubTiers::new(
            Some(series(&["2026-08-30T12:00:00Z"], &[3.0], &[4.0])),
            None,
        );
        let resolver = Arc::new(WindResolver::new(stub));
        let queries = vec![
            query("2026-08-30T12:00:00Z"),
            query("2026-08-30T13:00:00Z"),
            query("2026-08-30T14:00:00Z"),
        ];
        let results = Arc::clone(&resolver).resolve_many(queries, 2).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_some()));
        assert_eq!(resolver.client.pressure_calls.load(Ordering::SeqCst), 3);
    }
}

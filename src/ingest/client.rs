use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinSet;
use utoipa::ToSchema;

use super::error::IngestError;
use super::normalize::normalize;
use super::types::Frame;
use crate::web::config::UpstreamConfig;

/// Hours of upstream history available (one file per hour, `00.json`..`23.json`).
pub const MAX_WINDOW_HOURS: u32 = 24;

/// Raw upstream response diagnostics, exposed by the debug endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct HourProbe {
    pub ok: bool,
    pub status: u16,
    pub content_type: String,
    pub length: usize,
    /// First 500 characters of the body, enough to see its shape.
    pub head: String,
}

/// Client for the hourly constellation snapshot files.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, IngestError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        if let Ok(referer) = HeaderValue::from_str(&config.referer) {
            headers.insert(REFERER, referer.clone());
            headers.insert(ORIGIN, referer);
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn hour_url(&self, age_hours: u32) -> String {
        // Cache-buster timestamp: upstream files are republished in place.
        format!(
            "{}/{:02}.json?ts={}",
            self.base,
            age_hours,
            Utc::now().timestamp_millis()
        )
    }

    /// Fetch one hour's payload. Any transport, status, or parse failure means
    /// the hour is simply absent; reconstruction proceeds with fewer frames.
    pub async fn fetch_hour(&self, age_hours: u32) -> Option<Value> {
        let url = self.hour_url(age_hours);
        let response = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                log::debug!("hour {:02} fetch failed: {}", age_hours, e);
                return None;
            }
        };
        if !response.status().is_success() {
            log::debug!("hour {:02} returned {}", age_hours, response.status());
            return None;
        }
        let text = response.text().await.ok()?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("hour {:02} not parseable as JSON: {}", age_hours, e);
                None
            }
        }
    }

    /// Fetch the last `hours` snapshots concurrently and normalize them into
    /// frames ordered newest-first. Absent or empty hours are skipped.
    pub async fn fetch_window(&self, hours: u32) -> Vec<Frame> {
        let hours = hours.min(MAX_WINDOW_HOURS);
        let now = Utc::now();

        let mut set = JoinSet::new();
        for age in 0..hours {
            let client = self.clone();
            set.spawn(async move { (age, client.fetch_hour(age).await) });
        }

        let mut slots: Vec<Option<Frame>> = (0..hours).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            let Ok((age, Some(payload))) = joined else { continue };
            let t = now - chrono::Duration::hours(age as i64);
            let reports = normalize(&payload, t);
            if !reports.is_empty() {
                slots[age as usize] = Some(Frame { age_hours: age, reports });
            }
        }

        let frames: Vec<Frame> = slots.into_iter().flatten().collect();
        let ages: Vec<u32> = frames.iter().map(|f| f.age_hours).collect();
        log::debug!("window: {} usable frames, ages {:?}", frames.len(), ages);
        frames
    }

    /// Raw fetch for diagnostics: reports status and body head instead of
    /// normalizing, and turns transport errors into an `ok: false` probe.
    pub async fn probe_hour(&self, age_hours: u32) -> Result<HourProbe, IngestError> {
        if age_hours >= MAX_WINDOW_HOURS {
            return Err(IngestError::HourOutOfRange(age_hours));
        }
        let url = self.hour_url(age_hours);
        let response = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                return Ok(HourProbe {
                    ok: false,
                    status: 0,
                    content_type: String::new(),
                    length: 0,
                    head: e.to_string(),
                })
            }
        };
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = response.text().await.unwrap_or_default();
        Ok(HourProbe {
            ok: status.is_success(),
            status: status.as_u16(),
            content_type,
            length: text.len(),
            head: text.chars().take(500).collect(),
        })
    }
}

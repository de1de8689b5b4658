use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub wind: WindApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// The hourly constellation snapshot source.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_base")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Sent as both Referer and Origin; the upstream rejects bare requests.
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// The tiered wind dataset source.
#[derive(Debug, Clone, Deserialize)]
pub struct WindApiConfig {
    #[serde(default = "default_wind_base")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on in-flight wind queries when resolving many points.
    #[serde(default = "default_wind_concurrency")]
    pub concurrency: usize,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_upstream_base() -> String {
    "https://a.windbornesystems.com/treasure".to_string()
}

fn default_user_agent() -> String {
    "balloon-tracks/0.1".to_string()
}

fn default_referer() -> String {
    "https://windbornesystems.com".to_string()
}

fn default_window_hours() -> u32 {
    24
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_wind_base() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_wind_concurrency() -> usize {
    8
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base(),
            user_agent: default_user_agent(),
            referer: default_referer(),
            window_hours: default_window_hours(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for WindApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_wind_base(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_wind_concurrency(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = Config::default();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.upstream.window_hours, 24);
        assert_eq!(config.wind.concurrency, 8);
    }

    #[test]
    fn partial_yaml_fills_the_rest_with_defaults() {
        let config: Config = serde_yaml::from_str(
            "web:\n  bind: \"127.0.0.1:9000\"\nupstream:\n  window_hours: 6\n",
        )
        .unwrap();
        assert_eq!(config.web.bind, "127.0.0.1:9000");
        assert_eq!(config.upstream.window_hours, 6);
        assert_eq!(config.upstream.base_url, default_upstream_base());
        assert_eq!(config.wind.base_url, default_wind_base());
    }
}

use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::{Context, Result};

use super::{validator, Config, RefreshMode};

/// Environment variable naming the JSON config file used by the binary.
pub const CONFIG_ENV_VAR: &str = "MARKET_SNAPSHOT_CONFIG";

/// Load a JSON config file, overlaying its keys on the builtin defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config JSON at {}", path.display()))?;

    parse_config(&json)
        .with_context(|| format!("invalid config JSON at {}", path.display()))
        .map_err(Into::into)
}

pub fn parse_config(json: &str) -> Result<Config> {
    let raw: RawConfig = serde_json::from_str(json)?;
    let config = raw.apply_to(Config::builtin());
    validator::validate_config(&config)?;
    Ok(config)
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    upstream: RawUpstreamConfig,
    #[serde(default)]
    http: RawHttpConfig,
    #[serde(default)]
    retry: RawRetryConfig,
    #[serde(default)]
    refresh: Option<RawRefreshMode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUpstreamConfig {
    base_url: Option<String>,
    landing_path: Option<String>,
    data_path: Option<String>,
    index_name: Option<String>,
    data_field: Option<String>,
    #[serde(default)]
    headers: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHttpConfig {
    user_agent: Option<String>,
    accept_language: Option<String>,
    request_timeout_ms: Option<u64>,
    fetch_timeout_ms: Option<u64>,
    bootstrap_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRetryConfig {
    max_attempts: Option<u32>,
    backoff_base_ms: Option<u64>,
    max_backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawRefreshMode {
    Synchronous,
    Background,
}

impl RawConfig {
    fn apply_to(self, mut config: Config) -> Config {
        let upstream = &mut config.upstream;
        overlay(&mut upstream.base_url, self.upstream.base_url);
        overlay(&mut upstream.landing_path, self.upstream.landing_path);
        overlay(&mut upstream.data_path, self.upstream.data_path);
        overlay(&mut upstream.index_name, self.upstream.index_name);
        overlay(&mut upstream.data_field, self.upstream.data_field);
        upstream.headers.extend(self.upstream.headers);

        let http = &mut config.http;
        overlay(&mut http.user_agent, self.http.user_agent);
        overlay(&mut http.accept_language, self.http.accept_language);
        overlay(&mut http.request_timeout, millis(self.http.request_timeout_ms));
        overlay(&mut http.fetch_timeout, millis(self.http.fetch_timeout_ms));
        overlay(&mut http.bootstrap_delay, millis(self.http.bootstrap_delay_ms));

        let retry = &mut config.retry;
        overlay(&mut retry.max_attempts, self.retry.max_attempts);
        overlay(&mut retry.backoff_base, millis(self.retry.backoff_base_ms));
        overlay(&mut retry.max_backoff, millis(self.retry.max_backoff_ms));

        if let Some(mode) = self.refresh {
            config.refresh = match mode {
                RawRefreshMode::Synchronous => RefreshMode::Synchronous,
                RawRefreshMode::Background => RefreshMode::Background,
            };
        }

        config
    }
}

fn overlay<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn millis(value: Option<u64>) -> Option<Duration> {
    value.map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_shipped_nse_profile() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let config = load_config(&root.join("assets").join("configs").join("nse.json"))
            .expect("load nse config");

        assert_eq!(config.upstream.base_url, "https://www.nseindia.com");
        assert_eq!(config.upstream.index_name, "NIFTY TOTAL MARKET");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.http.request_timeout, Duration::from_secs(20));
    }

    #[test]
    fn empty_document_yields_builtin_defaults() {
        let config = parse_config("{}").expect("parse empty config");
        let builtin = Config::builtin();

        assert_eq!(config.upstream.data_path, builtin.upstream.data_path);
        assert_eq!(config.retry, builtin.retry);
        assert_eq!(config.refresh, RefreshMode::Synchronous);
    }

    #[test]
    fn partial_document_overrides_only_named_keys() {
        let config = parse_config(
            r#"{
                "upstream": { "index_name": "NIFTY 50", "headers": { "X-Client": "gateway" } },
                "http": { "fetch_timeout_ms": 180000 },
                "retry": { "max_attempts": 5, "backoff_base_ms": 250 },
                "refresh": "background"
            }"#,
        )
        .expect("parse partial config");

        assert_eq!(config.upstream.index_name, "NIFTY 50");
        assert_eq!(config.upstream.base_url, "https://www.nseindia.com");
        assert_eq!(
            config.upstream.headers.get("X-Client").map(String::as_str),
            Some("gateway")
        );
        assert_eq!(config.http.fetch_timeout, Duration::from_secs(180));
        assert_eq!(config.http.request_timeout, Duration::from_secs(20));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_base, Duration::from_millis(250));
        assert_eq!(config.retry.max_backoff, Duration::from_secs(8));
        assert_eq!(config.refresh, RefreshMode::Background);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_config(r#"{ "http": { "timeout": 10 } }"#).expect_err("should fail");
        assert!(err.to_string().contains("timeout"), "unexpected error: {err}");
    }

    #[test]
    fn overridden_values_are_validated() {
        let err = parse_config(r#"{ "retry": { "max_attempts": 0 } }"#).expect_err("should fail");
        assert!(
            err.to_string().contains("max_attempts"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn longer_retry_budget_needs_longer_fetch_timeout() {
        let err = parse_config(r#"{ "retry": { "max_attempts": 5 } }"#).expect_err("should fail");
        assert!(
            err.to_string().contains("worst-case fetch"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/market.json")).expect_err("should fail");
        assert!(err.to_string().contains("/nonexistent/market.json"));
    }
}

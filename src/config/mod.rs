use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

pub mod loader;
pub mod validator;

pub use loader::{load_config, parse_config, CONFIG_ENV_VAR};
pub use validator::validate_config;

use crate::utils::duration_ms;

const NSE_BASE_URL: &str = "https://www.nseindia.com";
const NSE_LANDING_PATH: &str = "/market-data/live-equity-market";
const NSE_DATA_PATH: &str = "/api/equity-stockIndices";
const DEFAULT_INDEX: &str = "NIFTY TOTAL MARKET";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

/// Where the market site lives and which index to ask it for.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub landing_path: String,
    pub data_path: String,
    pub index_name: String,
    /// Top-level key of the data response holding the record array.
    pub data_field: String,
    /// Extra headers sent on every request of a session.
    pub headers: HashMap<String, String>,
}

impl UpstreamConfig {
    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn root_url(&self) -> String {
        format!("{}/", self.base())
    }

    pub fn landing_url(&self) -> String {
        format!("{}{}", self.base(), self.landing_path)
    }

    pub fn data_url(&self) -> String {
        format!("{}{}", self.base(), self.data_path)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept_language: String,
    /// Bound applied to each individual request.
    #[serde(rename = "request_timeout_ms", with = "duration_ms")]
    pub request_timeout: Duration,
    /// Bound applied to a whole prime-and-retrieve cycle.
    #[serde(rename = "fetch_timeout_ms", with = "duration_ms")]
    pub fetch_timeout: Duration,
    /// Pause between the two bootstrap page visits.
    #[serde(rename = "bootstrap_delay_ms", with = "duration_ms")]
    pub bootstrap_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    #[serde(rename = "backoff_base_ms", with = "duration_ms")]
    pub backoff_base: Duration,
    #[serde(rename = "max_backoff_ms", with = "duration_ms")]
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay to wait after the `failed_attempts`-th consecutive failure.
    ///
    /// Doubles from `backoff_base` and saturates at `max_backoff`; the
    /// validator rejects policies whose delays would reach the cap within
    /// the attempt budget.
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(31);
        self.backoff_base
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Sum of every delay slept when all attempts fail.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts.max(1))
            .map(|failed| self.delay_after(failed))
            .sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

/// Freshness versus responsiveness trade-off of `fetch_market_snapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Wait for the fetch, then serve the (possibly refreshed) cache.
    #[default]
    Synchronous,
    /// Serve the cache at once and refresh it in the background.
    Background,
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub http: HttpConfig,
    pub retry: RetryPolicy,
    pub refresh: RefreshMode,
}

impl Config {
    pub fn builtin() -> Self {
        let upstream = UpstreamConfig {
            base_url: NSE_BASE_URL.to_string(),
            landing_path: NSE_LANDING_PATH.to_string(),
            data_path: NSE_DATA_PATH.to_string(),
            index_name: DEFAULT_INDEX.to_string(),
            data_field: "data".to_string(),
            headers: HashMap::new(),
        };

        let http = HttpConfig {
            user_agent: BROWSER_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            request_timeout: Duration::from_secs(20),
            fetch_timeout: Duration::from_secs(120),
            bootstrap_delay: Duration::from_secs(1),
        };

        Config {
            upstream,
            http,
            retry: RetryPolicy::default(),
            refresh: RefreshMode::default(),
        }
    }

    /// Longest a prime-and-retrieve cycle can take when every request runs
    /// into `request_timeout`: two bootstrap pages, the pause between them,
    /// then every data attempt with its backoff.
    pub fn worst_case_fetch(&self) -> Duration {
        let requests = self.retry.max_attempts.max(1).saturating_add(2);
        self.http
            .request_timeout
            .saturating_mul(requests)
            .saturating_add(self.http.bootstrap_delay)
            .saturating_add(self.retry.total_backoff())
    }

    /// Point the builtin profile at another host, keeping every other default.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::builtin();
        config.upstream.base_url = base_url.into();
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}

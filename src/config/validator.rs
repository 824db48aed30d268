use reqwest::header::{HeaderName, HeaderValue};

use crate::error::{AppError, Result};

use super::{Config, HttpConfig, RetryPolicy, UpstreamConfig};

/// Validate a config and surface every problem in one descriptive error.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    validate_upstream(&config.upstream, &mut issues);
    validate_http(&config.http, &mut issues);
    validate_retry(&config.retry, &mut issues);
    validate_fetch_budget(config, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "market snapshot config invalid:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn validate_upstream(upstream: &UpstreamConfig, issues: &mut Vec<String>) {
    let base = upstream.base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        issues.push(format!(
            "upstream.base_url `{}` must start with http:// or https://",
            upstream.base_url
        ));
    } else if reqwest::Url::parse(base).is_err() {
        issues.push(format!(
            "upstream.base_url `{}` is not a valid URL",
            upstream.base_url
        ));
    }

    for (label, path) in [
        ("landing_path", &upstream.landing_path),
        ("data_path", &upstream.data_path),
    ] {
        if !path.starts_with('/') {
            issues.push(format!("upstream.{label} `{path}` must start with `/`"));
        }
    }

    if upstream.index_name.trim().is_empty() {
        issues.push("upstream.index_name must not be empty".to_string());
    }

    if upstream.data_field.trim().is_empty() {
        issues.push("upstream.data_field must not be empty".to_string());
    }

    for (name, value) in &upstream.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            issues.push(format!("upstream.headers has invalid header name `{name}`"));
        }
        if HeaderValue::from_str(value).is_err() {
            issues.push(format!("upstream.headers has invalid value for `{name}`"));
        }
    }
}

fn validate_http(http: &HttpConfig, issues: &mut Vec<String>) {
    if http.user_agent.trim().is_empty() || HeaderValue::from_str(&http.user_agent).is_err() {
        issues.push("http.user_agent must be a non-empty header value".to_string());
    }

    if HeaderValue::from_str(&http.accept_language).is_err() {
        issues.push("http.accept_language must be a valid header value".to_string());
    }

    if http.request_timeout.is_zero() {
        issues.push("http.request_timeout_ms must be greater than zero".to_string());
    }

    if http.fetch_timeout.is_zero() {
        issues.push("http.fetch_timeout_ms must be greater than zero".to_string());
    }
}

fn validate_retry(retry: &RetryPolicy, issues: &mut Vec<String>) {
    if retry.max_attempts == 0 {
        issues.push("retry.max_attempts must be at least 1".to_string());
    }

    if retry.backoff_base > retry.max_backoff {
        issues.push(format!(
            "retry.backoff_base_ms ({}) exceeds retry.max_backoff_ms ({})",
            retry.backoff_base.as_millis(),
            retry.max_backoff.as_millis()
        ));
        return;
    }

    if retry.max_attempts < 2 {
        return;
    }

    if retry.backoff_base.is_zero() {
        issues.push("retry.backoff_base_ms must be greater than zero".to_string());
        return;
    }

    // The last retry waits base * 2^(attempts - 2); it must stay under the cap
    // or later delays stop growing.
    let retries = retry.max_attempts - 1;
    let uncapped = 1u32
        .checked_shl(retries - 1)
        .and_then(|factor| retry.backoff_base.checked_mul(factor));
    if uncapped.map_or(true, |longest| longest > retry.max_backoff) {
        issues.push(format!(
            "retry delays reach retry.max_backoff_ms ({}) before the last of {} attempts",
            retry.max_backoff.as_millis(),
            retry.max_attempts
        ));
    }
}

fn validate_fetch_budget(config: &Config, issues: &mut Vec<String>) {
    let http = &config.http;
    if http.fetch_timeout.is_zero() || http.request_timeout.is_zero() {
        return;
    }

    let worst_case = config.worst_case_fetch();
    if http.fetch_timeout < worst_case {
        issues.push(format!(
            "http.fetch_timeout_ms ({}) is shorter than the worst-case fetch ({} ms: \
             priming plus {} attempts)",
            http.fetch_timeout.as_millis(),
            worst_case.as_millis(),
            config.retry.max_attempts
        ));
    }
}

//! Failure taxonomy for upstream snapshot acquisition.
//!
//! Every step that talks to the market site (priming and the data call)
//! reports one of these variants, so the retry loop and the orchestrator can
//! treat them uniformly.

use reqwest::StatusCode;
use thiserror::Error;

/// How the retry loop should react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Transient upstream trouble; try again after a backoff delay.
    WithBackoff,
    /// Terminal for this attempt; retrying will not change the outcome.
    Never,
}

/// Coarse reason reported alongside a failed retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    HttpStatus,
    Parse,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::Network => "network",
            FailureKind::HttpStatus => "http-status",
            FailureKind::Parse => "parse",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout or a broken body stream.
    #[error("network error while requesting {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP 429.
    #[error("upstream throttled request to {url} (status {status})")]
    UpstreamThrottled { url: String, status: StatusCode },

    /// HTTP 500, 502, 503 or 504.
    #[error("upstream unavailable for {url} (status {status})")]
    UpstreamUnavailable { url: String, status: StatusCode },

    /// Any other unexpected status, typically a blocked session.
    #[error("upstream rejected request to {url} (status {status})")]
    UpstreamRejected { url: String, status: StatusCode },

    /// Body was not JSON or did not have the expected shape.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// The session client could not be constructed.
    #[error("failed to build HTTP session: {0}")]
    Client(#[source] reqwest::Error),

    /// The orchestrated fetch exceeded its outer time bound.
    #[error("snapshot fetch abandoned after {0:?}")]
    Abandoned(std::time::Duration),
}

impl FetchError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        FetchError::Network {
            url: url.into(),
            source,
        }
    }

    /// Classify an error raised while sending a request or reading its body.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_builder() {
            FetchError::Client(source)
        } else {
            FetchError::network(url, source)
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        FetchError::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Map an unexpected status onto the matching failure class.
    pub fn from_status(url: impl Into<String>, status: StatusCode) -> Self {
        let url = url.into();
        match status.as_u16() {
            429 => FetchError::UpstreamThrottled { url, status },
            500 | 502 | 503 | 504 => FetchError::UpstreamUnavailable { url, status },
            _ => FetchError::UpstreamRejected { url, status },
        }
    }

    pub fn retry_class(&self) -> RetryClass {
        match self {
            FetchError::Network { .. }
            | FetchError::UpstreamThrottled { .. }
            | FetchError::UpstreamUnavailable { .. } => RetryClass::WithBackoff,

            FetchError::UpstreamRejected { .. }
            | FetchError::MalformedResponse { .. }
            | FetchError::Client(_)
            | FetchError::Abandoned(_) => RetryClass::Never,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Network { .. } | FetchError::Client(_) | FetchError::Abandoned(_) => {
                FailureKind::Network
            }
            FetchError::UpstreamThrottled { .. }
            | FetchError::UpstreamUnavailable { .. }
            | FetchError::UpstreamRejected { .. } => FailureKind::HttpStatus,
            FetchError::MalformedResponse { .. } => FailureKind::Parse,
        }
    }
}

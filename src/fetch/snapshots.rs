use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::Config;
use crate::records::Snapshot;

use super::decode::decode_snapshot;
use super::request::{data_request_url, same_origin_headers};
use super::retry::retry_with_backoff;
use super::session::{Session, SessionPrimer};
use super::{FetchError, FetchResult};

/// Anything able to produce one fresh snapshot per call.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> FetchResult<Snapshot>;
}

/// Issues the index-data request over a primed session, retrying transient failures.
pub struct SnapshotRetriever {
    config: Arc<Config>,
}

impl SnapshotRetriever {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub async fn retrieve(&self, session: &Session) -> FetchResult<Snapshot> {
        retry_with_backoff(&self.config.retry, "snapshot request", move |attempt| {
            self.fetch_once(session, attempt)
        })
        .await
    }

    async fn fetch_once(&self, session: &Session, attempt: u32) -> FetchResult<Snapshot> {
        let upstream = &self.config.upstream;
        let url = data_request_url(upstream);
        log::debug!("Requesting {} (attempt {})", url, attempt);

        let response = session
            .client()
            .get(&url)
            .headers(same_origin_headers(session.landing_url()))
            .send()
            .await
            .map_err(|err| FetchError::transport(&url, err))?;

        // Partial or proxied 2xx bodies are not a full snapshot.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::from_status(&url, status));
        }

        let body = response
            .text()
            .await
            .map_err(|err| FetchError::transport(&url, err))?;

        decode_snapshot(&body, &upstream.data_field)
    }
}

/// Production source: prime a fresh session, then retrieve over it.
pub struct NseSource {
    primer: SessionPrimer,
    retriever: SnapshotRetriever,
}

impl NseSource {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            primer: SessionPrimer::new(Arc::clone(&config)),
            retriever: SnapshotRetriever::new(config),
        }
    }
}

#[async_trait]
impl SnapshotSource for NseSource {
    async fn fetch_snapshot(&self) -> FetchResult<Snapshot> {
        let session = self.primer.prime().await?;
        self.retriever.retrieve(&session).await
    }
}

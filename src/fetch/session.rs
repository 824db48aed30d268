use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::Client;
use tokio::time::sleep;

use crate::config::Config;

use super::request::{navigation_headers, referred_headers};
use super::{FetchError, FetchResult};

/// Cookie-bearing client produced by priming, valid for one retrieval.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    landing_url: String,
}

impl Session {
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Page the data call should claim to come from.
    pub fn landing_url(&self) -> &str {
        &self.landing_url
    }
}

/// Visits the bootstrap pages so the market site hands out its session cookies.
pub struct SessionPrimer {
    config: Arc<Config>,
}

impl SessionPrimer {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub async fn prime(&self) -> FetchResult<Session> {
        let client = self.build_client()?;
        let upstream = &self.config.upstream;

        let root_url = upstream.root_url();
        visit(&client, &root_url, HeaderMap::new())
            .await
            .map_err(|err| log_step_failure("root page", err))?;

        sleep(self.config.http.bootstrap_delay).await;

        let landing_url = upstream.landing_url();
        visit(&client, &landing_url, referred_headers(&root_url))
            .await
            .map_err(|err| log_step_failure("landing page", err))?;

        log::debug!("Session primed against {}", upstream.base_url);
        Ok(Session {
            client,
            landing_url,
        })
    }

    fn build_client(&self) -> FetchResult<Client> {
        Client::builder()
            .cookie_store(true)
            .default_headers(navigation_headers(&self.config))
            .timeout(self.config.http.request_timeout)
            .build()
            .map_err(FetchError::Client)
    }
}

async fn visit(client: &Client, url: &str, headers: HeaderMap) -> FetchResult<()> {
    let response = client
        .get(url)
        .headers(headers)
        .send()
        .await
        .map_err(|err| FetchError::transport(url, err))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::from_status(url, status));
    }

    // Drain the page so the connection closes cleanly; only the cookies matter.
    response
        .bytes()
        .await
        .map_err(|err| FetchError::transport(url, err))?;
    Ok(())
}

fn log_step_failure(step: &str, err: FetchError) -> FetchError {
    log::warn!("Session priming failed at {step} ({}): {err}", err.kind());
    err
}

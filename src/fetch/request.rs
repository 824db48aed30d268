use std::collections::HashMap;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};

use crate::config::{Config, UpstreamConfig};

const DOCUMENT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const JSON_ACCEPT: &str = "application/json, text/plain, */*";

const SEC_FETCH_DEST: &str = "sec-fetch-dest";
const SEC_FETCH_MODE: &str = "sec-fetch-mode";
const SEC_FETCH_SITE: &str = "sec-fetch-site";
const SEC_FETCH_USER: &str = "sec-fetch-user";

/// Default headers of a primed session: a browser opening the site from the address bar.
pub fn navigation_headers(config: &Config) -> HeaderMap {
    let mut map = HeaderMap::new();
    insert_str(&mut map, USER_AGENT, &config.http.user_agent);
    insert_str(&mut map, ACCEPT_LANGUAGE, &config.http.accept_language);
    map.insert(ACCEPT, HeaderValue::from_static(DOCUMENT_ACCEPT));
    map.insert(SEC_FETCH_DEST, HeaderValue::from_static("document"));
    map.insert(SEC_FETCH_MODE, HeaderValue::from_static("navigate"));
    map.insert(SEC_FETCH_SITE, HeaderValue::from_static("none"));
    map.insert(SEC_FETCH_USER, HeaderValue::from_static("?1"));
    map.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    map.extend(build_headers(&config.upstream.headers));
    map
}

/// Per-request overrides for a page-to-page hop within the site.
pub fn referred_headers(referer: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    insert_str(&mut map, REFERER, referer);
    map
}

/// Per-request overrides marking the data call as a follow-up from the landing page.
pub fn same_origin_headers(referer: &str) -> HeaderMap {
    let mut map = referred_headers(referer);
    map.insert(ACCEPT, HeaderValue::from_static(JSON_ACCEPT));
    map.insert(SEC_FETCH_SITE, HeaderValue::from_static("same-origin"));
    map
}

/// Full data endpoint URL with the index name percent-encoded.
pub fn data_request_url(upstream: &UpstreamConfig) -> String {
    format!(
        "{}?index={}",
        upstream.data_url(),
        urlencoding::encode(&upstream.index_name)
    )
}

fn insert_str(map: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            map.insert(name, value);
        }
        Err(_) => log::warn!("Skipping header {} with invalid value", name),
    }
}

fn build_headers(headers: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => log::warn!("Skipping invalid configured header {}", key),
        }
    }
    map
}

//! Mock market site shared by the session and retriever tests.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const LANDING_PATH: &str = "/market-data/live-equity-market";
pub const DATA_PATH: &str = "/api/equity-stockIndices";

pub const ROOT_COOKIE: &str = "nsit=root-cookie";
pub const LANDING_COOKIE: &str = "bm_sv=landing-cookie";

/// HTML page that hands out one session cookie.
pub fn page(cookie: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .append_header("Set-Cookie", format!("{cookie}; Path=/").as_str())
        .set_body_raw("<html></html>", "text/html")
}

pub fn json(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body, "application/json")
}

pub async fn mount_root(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_landing(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(LANDING_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Both bootstrap pages answer with their cookies.
pub async fn mount_bootstrap_pages(server: &MockServer) {
    mount_root(server, page(ROOT_COOKIE)).await;
    mount_landing(server, page(LANDING_COOKIE)).await;
}

/// Serve `response` for the next `times` data requests. Earlier mounts win,
/// so successive calls script a sequence.
pub async fn mount_data_once(server: &MockServer, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(DATA_PATH))
        .respond_with(response)
        .up_to_n_times(times)
        .mount(server)
        .await;
}

/// Serve `response` for every data request, asserting the call count on drop.
pub async fn mount_data(server: &MockServer, response: ResponseTemplate, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(DATA_PATH))
        .respond_with(response)
        .expect(expected_hits)
        .mount(server)
        .await;
}

pub async fn requests_to(server: &MockServer, route: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == route)
        .collect()
}

pub fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
}

//! Mock server helpers for the release index and artifact downloads

use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

/// Serve `{"tag_name": <build>}` from the release index, expecting `calls` requests
pub async fn mock_latest_release(server: &MockServer, build: u64, calls: u64) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tag_name": build,
            "name": format!("Build #{}", build),
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// Serve an arbitrary body from the release index
pub async fn mock_release_body(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Release index that only answers requests carrying the updater's identity headers
pub async fn mock_latest_release_with_headers(server: &MockServer, build: u64) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .and(header("user-agent", USER_AGENT))
        .and(header("accept", ACCEPT_V3))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tag_name": build.to_string(),
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Release index that answers too late
pub async fn mock_slow_release(server: &MockServer, build: u64, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "tag_name": build }))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Serve `content` as the artifact of `build`, expecting `calls` requests
pub async fn mock_artifact(server: &MockServer, build: u64, content: &[u8], calls: u64) {
    Mock::given(method("GET"))
        .and(path(artifact_path(build)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .expect(calls)
        .mount(server)
        .await;
}

/// Serve `content` as the artifact of `build` after `delay`, expecting `calls` requests
pub async fn mock_slow_artifact(
    server: &MockServer,
    build: u64,
    content: &[u8],
    delay: Duration,
    calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(artifact_path(build)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content)
                .set_delay(delay),
        )
        .expect(calls)
        .mount(server)
        .await;
}

/// Artifact endpoint failing with `status`
pub async fn mock_failing_artifact(server: &MockServer, build: u64, status: u16) {
    Mock::given(method("GET"))
        .and(path(artifact_path(build)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Publish a checksum file for `build`
pub async fn mock_checksum(server: &MockServer, build: u64, digest: &str) {
    Mock::given(method("GET"))
        .and(path(checksum_path(build)))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("{}  {}\n", digest, ARTIFACT_FILE)),
        )
        .mount(server)
        .await;
}

/// Number of requests the server has seen so far
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}

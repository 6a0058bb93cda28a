//! Recovery behavior under rate limiting and token expiry.

use crate::common::{config_for, init_tracing, mount_base, page_body};
use mockito::{Matcher, Server};
use opentargets_api::{Connection, ConnectionConfig, Credentials, OpenTargetsClient, RetryConfig};
use std::time::{Duration, Instant};

/// A 429 response suspends the request and the same call succeeds once the
/// server stops limiting. The limiting mock is registered first and capped
/// at one hit, so mockito serves it once and falls through to the success
/// mock on the retry.
#[test]
fn rate_limited_request_recovers() {
    init_tracing();
    let mut server = Server::new();
    mount_base(&mut server);
    server
        .mock("GET", "/api/latest/public/search")
        .match_query(Matcher::UrlEncoded("q".into(), "braf".into()))
        .with_status(429)
        .with_header("Retry-After", "0.2")
        .expect(1)
        .create();
    server
        .mock("GET", "/api/latest/public/search")
        .match_query(Matcher::UrlEncoded("q".into(), "braf".into()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a"], 1, 0))
        .create();

    let client = OpenTargetsClient::connect(config_for(&server)).unwrap();

    let started = Instant::now();
    let cursor = client.search("braf").unwrap();
    assert_eq!(cursor.len(), 1);
    // The advertised Retry-After must have been waited out at least once.
    assert!(started.elapsed() >= Duration::from_millis(200));
}

/// A 419 on an authenticated call is recovered transparently: the cached
/// token is validated, reported expired, reissued, and the original request
/// retried. The caller never sees the expiry. The 419 mock is registered
/// first and capped at one hit, so the retried request falls through to the
/// success mock.
#[test]
fn expired_token_is_reissued_transparently() {
    init_tracing();
    let mut server = Server::new();
    mount_base(&mut server);
    let token_mock = server
        .mock("POST", "/api/latest/public/auth/request_token")
        .match_body(Matcher::UrlEncoded("app_name".into(), "test-app".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"token": "tok-1"}"#)
        // connect-time issue plus at least one reissue
        .expect_at_least(2)
        .create();
    let validate = server
        .mock("GET", "/api/latest/public/auth/validate_token")
        .with_status(419)
        .expect_at_least(1)
        .create();
    server
        .mock("GET", "/api/latest/public/search")
        .match_query(Matcher::UrlEncoded("q".into(), "braf".into()))
        .with_status(419)
        .expect(1)
        .create();
    server
        .mock("GET", "/api/latest/public/search")
        .match_query(Matcher::UrlEncoded("q".into(), "braf".into()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a"], 1, 0))
        .create();

    let mut config = config_for(&server);
    config.credentials = Some(Credentials::new("test-app", "test-secret"));
    let client = OpenTargetsClient::connect(config).unwrap();

    let cursor = client.search("braf").unwrap();
    assert_eq!(cursor.len(), 1);

    validate.assert();
    token_mock.assert();
}

/// With a configured attempt cap, persistent limiting surfaces as an error
/// instead of waiting forever.
#[test]
fn persistent_rate_limiting_errors_out_when_capped() {
    init_tracing();
    let mut server = Server::new();
    mount_base(&mut server);
    let limited = server
        .mock("GET", "/api/latest/public/search")
        .match_query(Matcher::UrlEncoded("q".into(), "braf".into()))
        .with_status(429)
        .with_header("Retry-After", "0")
        .expect(4)
        .create();

    let url = server.url();
    let (host, port) = url.rsplit_once(':').unwrap();
    let config = ConnectionConfig::builder()
        .host(host)
        .port(port.parse().unwrap())
        .retry(
            RetryConfig::default()
                .with_rate_limit_delay(Duration::from_millis(5))
                .with_max_attempts(3),
        )
        .build();
    let conn = Connection::connect(config).unwrap();

    let err = conn
        .get(
            "/public/search",
            vec![("q".to_string(), "braf".to_string())],
        )
        .unwrap_err();
    assert!(err.is_rate_limited());
    limited.assert();
}

//! Shared fixtures for the integration suite: a swagger document covering
//! the endpoints under test, server setup and response builders.

use mockito::Server;
use opentargets_api::{ConnectionConfig, OpenTargetsClient, RetryConfig};
use serde_json::Value;
use std::time::Duration;

pub const SWAGGER: &str = r#"
swagger: '2.0'
info:
  title: Open Targets REST API
paths:
  /public/search:
    get:
      parameters:
        - name: q
          type: string
        - name: filter
          type: string
        - name: size
          type: number
  /public/association/filter:
    get:
      parameters:
        - name: target
          type: string
        - name: disease
          type: string
        - name: direct
          type: boolean
        - name: scorevalue_min
          type: number
        - name: size
          type: number
        - name: from
          type: number
  /public/evidence:
    get:
      parameters:
        - name: id
          type: string
  /public/evidence/filter:
    get:
      parameters:
        - name: target
          type: string
        - name: disease
          type: string
        - name: from
          type: number
  /public/utils/version:
    get: {}
"#;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mount the swagger document and version endpoint every connection fetches.
pub fn mount_base(server: &mut Server) {
    server
        .mock("GET", "/api/docs/swagger.yaml")
        .with_body(SWAGGER)
        .create();
    server
        .mock("GET", "/api/latest/public/utils/version")
        .with_header("content-type", "application/json")
        .with_body("1.2")
        .create();
}

pub fn config_for(server: &Server) -> ConnectionConfig {
    let url = server.url();
    let (host, port) = url.rsplit_once(':').unwrap();
    ConnectionConfig::builder()
        .host(host)
        .port(port.parse().unwrap())
        .retry(RetryConfig::default().with_rate_limit_delay(Duration::from_millis(10)))
        .build()
}

pub fn client_for(server: &Server) -> OpenTargetsClient {
    init_tracing();
    OpenTargetsClient::connect(config_for(server)).unwrap()
}

/// Render a paginated envelope with `{"id": ...}` records.
pub fn page_body(ids: &[&str], total: usize, from: usize) -> String {
    let data: Vec<Value> = ids.iter().map(|id| serde_json::json!({"id": id})).collect();
    serde_json::json!({"data": data, "total": total, "from": from, "size": ids.len()}).to_string()
}

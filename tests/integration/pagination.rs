//! Pagination across multiple fetches and fair-usage reporting.

use crate::common::{client_for, mount_base, page_body};
use mockito::{Matcher, Server};
use opentargets_api::Filters;

/// Iterating a cursor yields exactly the declared total, pulling further
/// pages transparently.
#[test]
fn iteration_yields_declared_total_across_pages() {
    let mut server = Server::new();
    mount_base(&mut server);
    server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Regex("^target=ENSG1$".to_string()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a", "b"], 5, 0))
        .create();
    server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Regex("^from=2&target=ENSG1$".to_string()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["c", "d"], 5, 2))
        .create();
    server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Regex("^from=4&target=ENSG1$".to_string()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["e"], 5, 4))
        .create();

    let client = client_for(&server);
    let cursor = client
        .filter_associations(Filters::new().with("target", "ENSG1"))
        .unwrap();
    assert_eq!(cursor.len(), 5);

    let ids: Vec<String> = cursor
        .map(|r| r.unwrap()["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
}

/// A server that stops sending records before the declared total ends the
/// iteration instead of refetching forever.
#[test]
fn short_result_set_terminates() {
    let mut server = Server::new();
    mount_base(&mut server);
    server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Regex("^target=ENSG1$".to_string()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a", "b"], 10, 0))
        .create();
    let empty_page = server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Regex("^from=2&target=ENSG1$".to_string()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&[], 10, 2))
        .expect(1)
        .create();

    let client = client_for(&server);
    let cursor = client
        .filter_associations(Filters::new().with("target", "ENSG1"))
        .unwrap();
    assert_eq!(cursor.count(), 2);
    empty_page.assert();
}

#[test]
fn usage_headers_are_surfaced() {
    let mut server = Server::new();
    mount_base(&mut server);
    server
        .mock("GET", "/api/latest/public/search")
        .match_query(Matcher::UrlEncoded("q".into(), "braf".into()))
        .with_header("content-type", "application/json")
        .with_header("X-Usage-Limit-1h", "1200")
        .with_header("X-Usage-Remaining-1h", "1100")
        .with_header("X-Usage-Limit-10s", "600")
        .with_header("X-Usage-Remaining-10s", "599")
        .with_body(page_body(&["a"], 1, 0))
        .create();

    let client = client_for(&server);
    let cursor = client.search("braf").unwrap();

    let usage = cursor.usage().unwrap();
    assert_eq!(usage.limit.hour, 1200);
    assert_eq!(usage.remaining.seconds_10, 599);
    assert_eq!(usage.minimum_remaining(), 599);
    assert!(!usage.exceeded());
}

#[test]
fn missing_usage_headers_mean_no_usage() {
    let mut server = Server::new();
    mount_base(&mut server);
    server
        .mock("GET", "/api/latest/public/search")
        .match_query(Matcher::UrlEncoded("q".into(), "braf".into()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a"], 1, 0))
        .create();

    let client = client_for(&server);
    let cursor = client.search("braf").unwrap();
    assert!(cursor.usage().is_none());
}

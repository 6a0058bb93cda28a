//! Endpoint behavior end to end: filter composition, lookups by id and
//! pre-flight validation.

use crate::common::{client_for, mount_base, page_body};
use mockito::{Matcher, Server};
use opentargets_api::{ErrorKind, Filters};

/// Chained single filters and one combined filter set must produce the same
/// request and therefore the same ordered result.
#[test]
fn chained_and_combined_filters_are_equivalent() {
    let mut server = Server::new();
    mount_base(&mut server);
    server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Regex("^target=ENSG1$".to_string()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a", "b", "c"], 3, 0))
        .create();
    server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Regex("^direct=true&target=ENSG1$".to_string()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a", "b", "c"], 3, 0))
        .create();
    let narrowed = server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Regex(
            "^direct=true&scorevalue_min=0.2&target=ENSG1$".to_string(),
        ))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a", "c"], 2, 0))
        .expect(2)
        .create();

    let client = client_for(&server);

    let chained: Vec<String> = client
        .filter_associations(Filters::new().with("target", "ENSG1"))
        .unwrap()
        .filter("direct", true)
        .unwrap()
        .filter("scorevalue_min", 0.2)
        .unwrap()
        .map(|r| r.unwrap()["id"].as_str().unwrap().to_string())
        .collect();

    let combined: Vec<String> = client
        .filter_associations(
            Filters::new()
                .with("direct", true)
                .with("scorevalue_min", 0.2)
                .with("target", "ENSG1"),
        )
        .unwrap()
        .map(|r| r.unwrap()["id"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(chained, combined);
    assert_eq!(chained, vec!["a", "c"]);
    narrowed.assert();
}

/// Chained filtering only ever narrows: each step's total is at most the
/// previous one.
#[test]
fn filtering_narrows_monotonically() {
    let mut server = Server::new();
    mount_base(&mut server);
    server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Regex("^target=ENSG1$".to_string()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a", "b", "c", "d"], 4, 0))
        .create();
    server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Regex("^direct=true&target=ENSG1$".to_string()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a", "c"], 2, 0))
        .create();

    let client = client_for(&server);
    let cursor = client
        .filter_associations(Filters::new().with("target", "ENSG1"))
        .unwrap();
    let before = cursor.len();
    let cursor = cursor.filter("direct", true).unwrap();
    assert!(cursor.len() <= before);
}

/// An ill-typed filter value is rejected locally, before any request is made.
#[test]
fn invalid_filter_never_reaches_the_network() {
    let mut server = Server::new();
    mount_base(&mut server);
    server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(page_body(&["a"], 1, 0))
        .expect(1)
        .create();
    let filtered = server
        .mock("GET", "/api/latest/public/association/filter")
        .match_query(Matcher::UrlEncoded("direct".into(), "maybe".into()))
        .expect(0)
        .create();

    let client = client_for(&server);
    let cursor = client.filter_associations(Filters::new()).unwrap();

    let err = cursor.filter("direct", "maybe").unwrap_err();
    assert!(err.is_invalid_parameter());
    assert!(err
        .to_string()
        .contains("is not a valid parameter for endpoint /public/association/filter"));
    filtered.assert();
}

#[test]
fn evidence_lookup_by_id() {
    let mut server = Server::new();
    mount_base(&mut server);
    server
        .mock("GET", "/api/latest/public/evidence")
        .match_query(Matcher::UrlEncoded("id".into(), "ev-42".into()))
        .with_header("content-type", "application/json")
        .with_body(page_body(&["ev-42"], 1, 0))
        .create();

    let client = client_for(&server);
    let response = client.get_evidence("ev-42").unwrap();
    assert_eq!(response.len(), 1);
    assert_eq!(response.records()[0]["id"], "ev-42");
}

#[test]
fn unresolvable_search_term_is_not_found() {
    let mut server = Server::new();
    mount_base(&mut server);
    server
        .mock("GET", "/api/latest/public/search")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": [], "total": 0}"#)
        .create();

    let client = client_for(&server);
    let err = client.get_evidence_for_target("nothing-here").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotFound(_)));
}

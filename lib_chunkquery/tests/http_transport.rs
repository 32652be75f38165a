#![cfg(feature = "retrieve")]

mod common;

use std::time::Duration;

use lib_chunkquery::retrieve::MsqlHttpTransport;
use lib_chunkquery::{
    ChunkQueryError, ChunkedRetrieval, Identity, Query, QueryTransport, RetryPolicy,
    TransportError,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{endpoint_error, rows, success};

const QUERY: &str = "SELECT OBJECTS() FROM Individual";

fn request(start_record: usize, limit_to: usize) -> serde_json::Value {
    json!({ "query": QUERY, "startRecord": start_record, "limitTo": limit_to })
}

#[tokio::test]
async fn posts_the_query_window_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ExecuteMSQL"))
        .and(header("authorization", "Bearer token-123"))
        .and(body_json(request(40, 20)))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(rows(40, 2))))
        .expect(1)
        .mount(&server)
        .await;

    let transport = MsqlHttpTransport::new(&server.uri(), Some("token-123".into())).unwrap();
    let raw = transport.execute_query(QUERY, 40, 20).await.unwrap();

    assert_eq!(raw, success(rows(40, 2)));
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ExecuteMSQL"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let transport = MsqlHttpTransport::new(&server.uri(), None).unwrap();
    let err = transport.execute_query(QUERY, 0, 10).await.unwrap_err();

    assert_eq!(
        err,
        TransportError::Status {
            status: 502,
            body: "bad gateway".into()
        }
    );
}

#[tokio::test]
async fn undecodable_body_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<soap:Fault/>"))
        .mount(&server)
        .await;

    let transport = MsqlHttpTransport::new(&server.uri(), None).unwrap();
    let err = transport.execute_query(QUERY, 0, 10).await.unwrap_err();

    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn custom_path_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/api/", server.uri());
    let transport = MsqlHttpTransport::with_options(&base, "query", None, Some(Duration::from_secs(5)))
        .unwrap();

    assert_eq!(transport.path(), "query");
    transport.execute_query(QUERY, 0, 10).await.unwrap();
}

#[tokio::test]
async fn retrieval_walks_pages_over_http() {
    let server = MockServer::start().await;
    for (start, count) in [(0, 3), (3, 3), (6, 1)] {
        Mock::given(method("POST"))
            .and(path("/ExecuteMSQL"))
            .and(body_json(request(start, 3)))
            .respond_with(ResponseTemplate::new(200).set_body_json(success(rows(start, count))))
            .expect(1)
            .mount(&server)
            .await;
    }

    let transport = MsqlHttpTransport::new(&server.uri(), None).unwrap();
    let retrieval = ChunkedRetrieval::new(transport, RetryPolicy::new(3, Duration::from_millis(1)));
    let query = Query::builder(QUERY).limit_per_page(3).build().unwrap();

    let items = retrieval.get_all(&query, &Identity).await.unwrap();

    let ids: Vec<_> = items.iter().map(|row| row.field("ID").cloned()).collect();
    assert_eq!(ids, (0..7).map(|n| Some(json!(n))).collect::<Vec<_>>());
}

#[tokio::test]
async fn server_errors_are_retried_then_recovered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(rows(0, 2))))
        .expect(1)
        .mount(&server)
        .await;

    let transport = MsqlHttpTransport::new(&server.uri(), None).unwrap();
    let retrieval = ChunkedRetrieval::new(transport, RetryPolicy::new(5, Duration::from_millis(1)));

    let items = retrieval
        .get_all(&Query::new(QUERY), &Identity)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn endpoint_errors_over_http_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(endpoint_error("Invalid MSQL")))
        .expect(1)
        .mount(&server)
        .await;

    let transport = MsqlHttpTransport::new(&server.uri(), None).unwrap();
    let retrieval = ChunkedRetrieval::new(transport, RetryPolicy::new(5, Duration::from_millis(1)));

    let err = retrieval
        .get_all(&Query::new(QUERY), &Identity)
        .await
        .unwrap_err();

    assert!(matches!(err, ChunkQueryError::EndpointQuery { .. }));
}

//! Integration tests for `HttpTransport` request/response calls
//!
//! Runs the transport against a local wiremock server and checks request
//! shape, status mapping and the retry policy.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use std::time::Duration;
use ticketing_sdk_core::endpoint::{Endpoint, PurchaseRequest};
use ticketing_sdk_core::error::NetworkError;
use ticketing_sdk_core::transport::{Transport, request_empty, request_json};
use ticketing_sdk_core::types::{Event, EventId, PaymentMethod, PaymentType};
use ticketing_sdk_testing::fixtures::mock_events;
use ticketing_sdk_transport::{ClientConfig, HttpTransport, RetryPolicy};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> HttpTransport {
    HttpTransport::new(&ClientConfig::new(server.uri(), "test-key")).unwrap()
}

fn retrying_transport_for(server: &MockServer) -> HttpTransport {
    let policy = RetryPolicy::builder()
        .max_retries(2)
        .initial_delay(Duration::from_millis(5))
        .build();
    HttpTransport::new(&ClientConfig::new(server.uri(), "test-key").with_retry(policy)).unwrap()
}

#[tokio::test]
async fn fetches_events_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_events()))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let events: Vec<Event> = request_json(&transport, &Endpoint::Events).await.unwrap();

    assert_eq!(events, mock_events());
}

#[tokio::test]
async fn search_sends_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events/search"))
        .and(query_param("q", "jazz night"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let events: Vec<Event> = request_json(
        &transport,
        &Endpoint::SearchEvents {
            query: "jazz night".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(events.is_empty());
}

#[tokio::test]
async fn posts_json_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/orders"))
        .and(body_json(json!({
            "reservation_id": "res-1",
            "payment_method": { "type": "applePay", "token": "tok" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let endpoint = Endpoint::PurchaseTickets(PurchaseRequest {
        reservation_id: "res-1".to_string(),
        payment_method: PaymentMethod::new(PaymentType::ApplePay, "tok"),
    });

    request_empty(&transport, &endpoint).await.unwrap();
}

#[tokio::test]
async fn maps_status_codes_to_errors() {
    let cases = [
        (400, NetworkError::BadRequest),
        (401, NetworkError::Unauthorized),
        (404, NetworkError::NotFound),
        (429, NetworkError::RateLimited),
        (503, NetworkError::ServerError),
        (418, NetworkError::Unknown { status_code: 418 }),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let result = transport
            .request(&Endpoint::Event {
                id: EventId::new("E1"),
            })
            .await;

        assert_eq!(result, Err(expected), "status {status}");
    }
}

#[tokio::test]
async fn malformed_body_is_a_decoding_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let result: Result<Vec<Event>, _> = request_json(&transport, &Endpoint::Events).await;

    assert!(matches!(result, Err(NetworkError::DecodingFailed(_))));
}

#[tokio::test]
async fn unreachable_server_is_no_connection() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let transport =
        HttpTransport::new(&ClientConfig::new(format!("http://{address}"), "test-key")).unwrap();

    assert_eq!(
        transport.request(&Endpoint::Events).await,
        Err(NetworkError::NoConnection)
    );
}

#[tokio::test]
async fn without_policy_nothing_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    assert_eq!(
        transport.request(&Endpoint::Events).await,
        Err(NetworkError::ServerError)
    );
}

#[tokio::test]
async fn transient_read_failures_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_events()))
        .expect(1)
        .mount(&server)
        .await;

    let transport = retrying_transport_for(&server);
    let events: Vec<Event> = request_json(&transport, &Endpoint::Events).await.unwrap();

    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn permanent_failures_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let transport = retrying_transport_for(&server);
    assert_eq!(
        transport.request(&Endpoint::Events).await,
        Err(NetworkError::NotFound)
    );
}

#[tokio::test]
async fn writes_are_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/orders/order-1/cancel"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let transport = retrying_transport_for(&server);
    let result = transport
        .request(&Endpoint::CancelOrder {
            id: "order-1".to_string(),
        })
        .await;

    assert_eq!(result, Err(NetworkError::ServerError));
}

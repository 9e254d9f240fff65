//! End-to-end delivery: dispatch through a live HTTP server, then
//! authenticate the captured request the way a receiver would.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use url::Url;
use uuid::Uuid;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use invoica_webhooks::{
    construct_event, dispatcher, InMemoryRegistrationStore, ReqwestTransport, WebhookConfig, WebhookDispatcher,
    WebhookEvent, WebhookEventType, WebhookRegistration,
};

fn registration_for(uri: &str, events: &[WebhookEventType]) -> WebhookRegistration {
    WebhookRegistration {
        id: Uuid::new_v4(),
        url: Url::parse(uri).unwrap(),
        events: events.iter().copied().collect::<BTreeSet<_>>(),
        secret: "integration-test-secret".to_string(),
        active: true,
        created_at: chrono::Utc::now(),
    }
}

fn dispatcher_for(store: Arc<InMemoryRegistrationStore>) -> WebhookDispatcher {
    let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(5)));
    WebhookDispatcher::with_transport(store, transport, &WebhookConfig::default())
}

#[tokio::test]
async fn delivered_request_authenticates_and_parses_on_the_receiver() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryRegistrationStore::new());
    let registration = registration_for(&mock_server.uri(), &[WebhookEventType::InvoiceCreated]);
    let secret = registration.secret.clone();
    store.insert(registration);

    let event = WebhookEvent::new(
        WebhookEventType::InvoiceCreated,
        json!({"id": "inv_123", "amount": 4200, "currency": "EUR"}),
    );
    let attempts = dispatcher_for(store).dispatch(&event).await;
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].outcome.is_success());

    // Pull the request off the wire and play receiver
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    let body = std::str::from_utf8(&request.body).unwrap();
    let signature = request
        .headers
        .get(dispatcher::SIGNATURE_HEADER)
        .expect("signature header missing")
        .to_str()
        .unwrap();

    let received = construct_event(body, signature, &secret).unwrap();
    assert_eq!(received.event_type, WebhookEventType::InvoiceCreated);
    assert_eq!(received.timestamp, event.timestamp);
    assert_eq!(received.data["id"], "inv_123");
    assert_eq!(received.data["amount"], 4200);

    // Remaining scheme B headers travel alongside the signature
    let event_header = request.headers.get(dispatcher::EVENT_HEADER).unwrap().to_str().unwrap();
    assert_eq!(event_header, "invoice.created");
    let timestamp_header = request.headers.get(dispatcher::TIMESTAMP_HEADER).unwrap().to_str().unwrap();
    assert_eq!(timestamp_header, event.timestamp.to_string());
}

#[tokio::test]
async fn wrong_secret_receiver_rejects_the_delivery() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryRegistrationStore::new());
    store.insert(registration_for(&mock_server.uri(), &[WebhookEventType::SettlementConfirmed]));

    let event = WebhookEvent::new(WebhookEventType::SettlementConfirmed, json!({"id": "stl_9"}));
    dispatcher_for(store).dispatch(&event).await;

    let requests = mock_server.received_requests().await.unwrap();
    let request = &requests[0];
    let body = std::str::from_utf8(&request.body).unwrap();
    let signature = request
        .headers
        .get(dispatcher::SIGNATURE_HEADER)
        .unwrap()
        .to_str()
        .unwrap();

    let result = construct_event(body, signature, "a-different-secret");
    assert!(matches!(result, Err(invoica_webhooks::Error::Verification)));
}

#[tokio::test]
async fn one_slow_failing_endpoint_does_not_block_the_rest() {
    let healthy = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&healthy)
        .await;

    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&failing)
        .await;

    let store = Arc::new(InMemoryRegistrationStore::new());
    store.insert(registration_for(&healthy.uri(), &[WebhookEventType::InvoicePaid]));
    store.insert(registration_for(&failing.uri(), &[WebhookEventType::InvoicePaid]));

    let event = WebhookEvent::new(WebhookEventType::InvoicePaid, json!({"id": "inv_7"}));
    let attempts = dispatcher_for(store).dispatch(&event).await;

    assert_eq!(attempts.len(), 2);
    let successes = attempts.iter().filter(|a| a.outcome.is_success()).count();
    assert_eq!(successes, 1);
}

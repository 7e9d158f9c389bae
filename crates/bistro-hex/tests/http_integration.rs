use bistro_hex::application::checkout_service::{CheckoutConfig, CheckoutService};
use bistro_hex::inbound::http::{HttpServer, HttpServerConfig};
use bistro_mail::NoopMailer;
use bistro_paypal::{PaypalClient, PaypalEnv};
use bistro_store::memory::InMemoryStore;
use bistro_types::ports::order_store::OrderStore;
use httpmock::prelude::*;
use serde_json::json;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

async fn start_server(
    provider: &MockServer,
    public_dir: std::path::PathBuf,
    store: InMemoryStore,
) -> String {
    let port = find_free_port();
    let gateway = PaypalClient::builder(PaypalEnv::Sandbox)
        .with_base_url(provider.base_url())
        .with_credentials("client-id", "client-secret")
        .build()
        .unwrap();
    let service = CheckoutService::new(store, gateway, NoopMailer, CheckoutConfig::default());
    let server = HttpServer::new(
        service,
        HttpServerConfig {
            port: port.to_string(),
            public_dir,
        },
    )
    .await
    .unwrap();

    tokio::spawn(async move {
        server.run().await.expect("server run");
    });

    // Give the server a moment to start.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

fn mock_token(provider: &MockServer) -> httpmock::Mock<'_> {
    provider.mock(|when, then| {
        when.method(POST).path("/v1/oauth2/token");
        then.status(200)
            .json_body(json!({ "access_token": "token-1" }));
    })
}

fn valid_payload() -> serde_json::Value {
    json!({
        "mode": "pickup",
        "customer": { "name": "Alice", "email": "alice@example.com" },
        "items": [
            { "id": "p1", "name": "Margherita", "unit_amount": 9.5, "quantity": 2 }
        ],
        "summary": { "subtotal": 19.0, "deliveryFee": 0.0, "total": 19.0 }
    })
}

#[tokio::test]
async fn create_and_capture_over_http() {
    let provider = MockServer::start();
    mock_token(&provider);
    provider.mock(|when, then| {
        when.method(POST).path("/v2/checkout/orders");
        then.status(201).json_body(json!({ "id": "PAYPAL-123" }));
    });
    provider.mock(|when, then| {
        when.method(POST).path("/v2/checkout/orders/PAYPAL-123/capture");
        then.status(201).json_body(json!({
            "id": "PAYPAL-123",
            "status": "COMPLETED",
            "purchase_units": [{
                "payments": { "captures": [{ "status": "COMPLETED", "amount": { "value": "19.00" } }] }
            }]
        }));
    });

    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryStore::new();
    let addr = start_server(&provider, dir.path().to_path_buf(), store.clone()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{addr}/api/orders/create"))
        .json(&valid_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["orderID"], "PAYPAL-123");

    let res = client
        .post(format!("{addr}/api/orders/capture"))
        .json(&json!({ "orderID": "PAYPAL-123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "COMPLETED");
    assert_eq!(body["captureResult"]["id"], "PAYPAL-123");

    // one created + one captured record
    assert_eq!(store.read_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn validation_failure_is_a_400_detail_list() {
    let provider = MockServer::start();
    let token_mock = mock_token(&provider);

    let dir = tempfile::tempdir().unwrap();
    let addr = start_server(&provider, dir.path().to_path_buf(), InMemoryStore::new()).await;

    let mut payload = valid_payload();
    payload["mode"] = json!("delivery");

    let res = reqwest::Client::new()
        .post(format!("{addr}/api/orders/create"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation failed");
    let details = body["details"].as_array().unwrap();
    assert!(details
        .iter()
        .any(|d| d["field"] == "customer.address"));

    token_mock.assert_hits(0);
}

#[tokio::test]
async fn malformed_body_is_a_400() {
    let provider = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let addr = start_server(&provider, dir.path().to_path_buf(), InMemoryStore::new()).await;

    let res = reqwest::Client::new()
        .post(format!("{addr}/api/orders/create"))
        .header("content-type", "application/json")
        .body("{\"mode\": 5}")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gateway_failure_mirrors_provider_status_and_persists_nothing() {
    let provider = MockServer::start();
    mock_token(&provider);
    provider.mock(|when, then| {
        when.method(POST).path("/v2/checkout/orders");
        then.status(500)
            .json_body(json!({ "message": "INTERNAL_SERVER_ERROR" }));
    });

    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryStore::new();
    let addr = start_server(&provider, dir.path().to_path_buf(), store.clone()).await;

    let res = reqwest::Client::new()
        .post(format!("{addr}/api/orders/create"))
        .json(&valid_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "payment provider error");

    assert!(store.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn health_and_static_fallback() {
    let provider = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("index.html"), "<html>aurora-index</html>")
        .await
        .unwrap();
    tokio::fs::write(dir.path().join("checkout-success.html"), "<html>success</html>")
        .await
        .unwrap();

    let addr = start_server(&provider, dir.path().to_path_buf(), InMemoryStore::new()).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{addr}/api/health")).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let res = client
        .get(format!("{addr}/checkout-success.html"))
        .send()
        .await
        .unwrap();
    assert!(res.text().await.unwrap().contains("success"));

    // any other non-API path serves the root document
    let res = client.get(format!("{addr}/menu")).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert!(res.text().await.unwrap().contains("aurora-index"));
}

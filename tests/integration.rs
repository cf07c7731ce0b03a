use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use serde_json::{Value, json};
use tower::ServiceExt;

use bosta_gateway::carrier::BostaClient;
use bosta_gateway::config::CarrierConfig;
use bosta_gateway::fulfillment::{self, FulfillmentStatus};
use bosta_gateway::models::order::{
    CustomerContact, LineItem, Order, PaymentMethod, ShippingAddress,
};
use bosta_gateway::observability::metrics::Metrics;
use bosta_gateway::state::AppState;

/// In-memory stand-in for the Bosta API. Counters let tests assert how many
/// times each endpoint was hit; flags switch failure behavior mid-test.
#[derive(Default)]
struct MockCarrier {
    logins: AtomicUsize,
    pricing_calls: AtomicUsize,
    create_calls: AtomicUsize,
    pickup_calls: AtomicUsize,
    reject_next_authed: AtomicBool,
    create_status: AtomicU16,
    create_succeeds: AtomicBool,
    cancel_succeeds: AtomicBool,
}

impl MockCarrier {
    fn new() -> Arc<Self> {
        let mock = Self::default();
        mock.create_status.store(201, Ordering::SeqCst);
        mock.create_succeeds.store(true, Ordering::SeqCst);
        mock.cancel_succeeds.store(true, Ordering::SeqCst);
        Arc::new(mock)
    }
}

async fn login(State(mock): State<Arc<MockCarrier>>) -> impl IntoResponse {
    let n = mock.logins.fetch_add(1, Ordering::SeqCst) + 1;
    axum::Json(json!({
        "success": true,
        "data": { "token": format!("Bearer token-{n}") }
    }))
}

async fn me() -> impl IntoResponse {
    axum::Json(json!({ "success": true, "data": { "email": "shop@example.com" } }))
}

async fn pickup_locations(State(mock): State<Arc<MockCarrier>>) -> impl IntoResponse {
    mock.pickup_calls.fetch_add(1, Ordering::SeqCst);
    axum::Json(json!({
        "success": true,
        "data": {
            "list": [
                {
                    "_id": "loc-extra",
                    "locationName": "Overflow Depot",
                    "isDefault": false,
                    "address": {
                        "city": { "name": "Giza" },
                        "district": "Dokki",
                        "firstLine": "9 Side St",
                        "buildingNumber": "2",
                        "floor": "1",
                        "apartment": "3"
                    }
                },
                {
                    "_id": "loc-main",
                    "locationName": "Main Warehouse",
                    "isDefault": true,
                    "address": {
                        "city": { "name": "Cairo" },
                        "district": "Maadi",
                        "firstLine": "1 Warehouse Rd",
                        "buildingNumber": "5",
                        "floor": "1",
                        "apartment": "2",
                        "zoneId": "zone-cairo"
                    }
                }
            ]
        }
    }))
}

async fn cities() -> impl IntoResponse {
    axum::Json(json!({
        "success": true,
        "data": {
            "list": [
                { "_id": "city-cairo", "name": "Cairo", "nameAr": "القاهرة", "code": "EG-01" },
                { "_id": "city-giza", "name": "Giza", "nameAr": "الجيزة", "code": "EG-25" }
            ]
        }
    }))
}

async fn districts(Path(city_id): Path<String>) -> impl IntoResponse {
    axum::Json(json!({
        "success": true,
        "data": [
            {
                "districtId": format!("d-none-{city_id}"),
                "districtName": "Pickup Only",
                "zoneId": format!("z-none-{city_id}"),
                "pickupAvailability": true,
                "dropOffAvailability": false
            },
            {
                "districtId": format!("d-{city_id}"),
                "districtName": "Central",
                "zoneId": format!("z-{city_id}"),
                "pickupAvailability": true,
                "dropOffAvailability": true
            }
        ]
    }))
}

async fn pricing(State(mock): State<Arc<MockCarrier>>) -> impl IntoResponse {
    if mock.reject_next_authed.swap(false, Ordering::SeqCst) {
        return (StatusCode::UNAUTHORIZED, axum::Json(json!({ "message": "expired" })))
            .into_response();
    }

    mock.pricing_calls.fetch_add(1, Ordering::SeqCst);
    axum::Json(json!({
        "success": true,
        "data": {
            "tier": {
                "cost": 45.0,
                "openingPackageFee": { "amount": 5.0 },
                "bostaMaterialFee": { "amount": 2.0 },
                "extraCodFee": { "percentage": 0.01, "minimumFeeAmount": 10.0 }
            }
        }
    }))
    .into_response()
}

async fn create_delivery(State(mock): State<Arc<MockCarrier>>) -> impl IntoResponse {
    mock.create_calls.fetch_add(1, Ordering::SeqCst);

    if !mock.create_succeeds.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({ "success": false, "message": "duplicate business reference" })),
        )
            .into_response();
    }

    let status = StatusCode::from_u16(mock.create_status.load(Ordering::SeqCst)).unwrap();
    (
        status,
        axum::Json(json!({
            "success": true,
            "data": {
                "_id": "delivery-1",
                "trackingNumber": "TRK12345",
                "state": { "value": "Pickup requested", "code": 10 }
            }
        })),
    )
        .into_response()
}

async fn terminate(State(mock): State<Arc<MockCarrier>>) -> impl IntoResponse {
    if mock.cancel_succeeds.load(Ordering::SeqCst) {
        axum::Json(json!({ "success": true, "message": "Terminated" })).into_response()
    } else {
        axum::Json(json!({ "success": false, "message": "delivery already picked up" }))
            .into_response()
    }
}

async fn tracking(Path(tracking_number): Path<String>) -> impl IntoResponse {
    axum::Json(json!({
        "success": true,
        "data": {
            "trackingNumber": tracking_number,
            "state": { "value": "In transit", "code": 30 },
            "updatedAt": "2024-05-01T10:00:00Z"
        }
    }))
}

async fn spawn_mock(mock: Arc<MockCarrier>) -> SocketAddr {
    let router = Router::new()
        .route("/users/login", post(login))
        .route("/users/me", get(me))
        .route("/pickup-locations", get(pickup_locations))
        .route("/cities", get(cities))
        .route("/cities/:id/districts", get(districts))
        .route("/pricing/shipment/calculator", get(pricing))
        .route("/deliveries", post(create_delivery))
        .route("/deliveries/business/:id/terminate", delete(terminate))
        .route("/deliveries/tracking/:tracking_number", get(tracking))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr, token_ttl_secs: u64) -> BostaClient {
    let config = CarrierConfig {
        base_url: format!("http://{addr}"),
        email: "shop@example.com".to_string(),
        password: "secret".to_string(),
        api_key: None,
        webhook_url: None,
        request_timeout_secs: 5,
        token_ttl_secs,
    };
    BostaClient::new(config, Metrics::new()).unwrap()
}

fn cod_order(id: i64, city: &str) -> Order {
    Order {
        id,
        items: vec![
            LineItem {
                product_name: "Ceramic Mug".to_string(),
                quantity: 2,
                unit_price: 120.0,
            },
            LineItem {
                product_name: "Tea Tray".to_string(),
                quantity: 1,
                unit_price: 260.0,
            },
        ],
        shipping_address: ShippingAddress {
            street: "12 Tahrir St".to_string(),
            building_number: "4".to_string(),
            floor: "2".to_string(),
            apartment: "7".to_string(),
            city: city.to_string(),
            district: "Downtown".to_string(),
            postal_code: "11511".to_string(),
        },
        payment_method: PaymentMethod::Cod,
        total: 500.0,
        customer: CustomerContact {
            name: "Mona Ahmed".to_string(),
            phone: "+201000000000".to_string(),
            email: "mona@example.com".to_string(),
        },
    }
}

#[tokio::test]
async fn token_is_reused_within_validity_window() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock.clone()).await;
    let client = client_for(addr, 3600);

    let first = client.estimate("Cairo", "Giza", 0.0).await.unwrap();
    let second = client.estimate("Cairo", "Giza", 0.0).await.unwrap();

    assert!(first.is_some());
    assert!(second.is_some());
    assert_eq!(mock.logins.load(Ordering::SeqCst), 1);
    assert_eq!(mock.pricing_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn expired_token_triggers_one_relogin_per_call() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock.clone()).await;
    // Zero TTL: every ensure_token sees an expired token.
    let client = client_for(addr, 0);

    client.estimate("Cairo", "Giza", 0.0).await.unwrap();
    client.estimate("Cairo", "Giza", 0.0).await.unwrap();

    assert_eq!(mock.logins.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn revoked_token_is_refreshed_and_call_retried_once() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock.clone()).await;
    let client = client_for(addr, 3600);

    // Warm the token, then have the carrier reject the next authed call.
    client.estimate("Cairo", "Giza", 0.0).await.unwrap();
    mock.reject_next_authed.store(true, Ordering::SeqCst);

    let quote = client.estimate("Cairo", "Giza", 0.0).await.unwrap();

    assert!(quote.is_some());
    assert_eq!(mock.logins.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unsupported_city_estimate_returns_none_without_network_calls() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock.clone()).await;
    let client = client_for(addr, 3600);

    let quote = client.estimate("Cairo", "Atlantis", 0.0).await.unwrap();

    assert!(quote.is_none());
    assert_eq!(mock.logins.load(Ordering::SeqCst), 0);
    assert_eq!(mock.pricing_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn quote_composes_all_fee_terms_over_http() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock.clone()).await;
    let client = client_for(addr, 3600);

    let quote = client
        .estimate("القاهرة", "giza", 1000.0)
        .await
        .unwrap()
        .expect("quote should be available");

    assert_eq!(quote.base_cost, 45.0);
    assert_eq!(quote.cod_fee, 10.0);
    assert_eq!(quote.total(), 62.0);
}

#[tokio::test]
async fn delivery_creation_accepts_200_and_201() {
    for status in [200u16, 201] {
        let mock = MockCarrier::new();
        mock.create_status.store(status, Ordering::SeqCst);
        let addr = spawn_mock(mock.clone()).await;
        let client = client_for(addr, 3600);

        let result = client.create_delivery(&cod_order(7, "Giza")).await.unwrap();

        assert_eq!(result.tracking_number, "TRK12345");
        assert_eq!(result.delivery_id, "delivery-1");
        assert_eq!(result.status.as_deref(), Some("Pickup requested"));
        assert_eq!(result.status_code, Some(10));
    }
}

#[tokio::test]
async fn delivery_creation_aborts_on_unresolvable_city() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock.clone()).await;
    let client = client_for(addr, 3600);

    let err = client
        .create_delivery(&cod_order(8, "Atlantis"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Atlantis"));
    assert_eq!(mock.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_creation_leaves_pending_retry_record_then_retry_succeeds() {
    let mock = MockCarrier::new();
    mock.create_succeeds.store(false, Ordering::SeqCst);
    let addr = spawn_mock(mock.clone()).await;
    let client = client_for(addr, 3600);
    let state = AppState::new(client, Metrics::new());

    let record = fulfillment::create_for_order(&state, cod_order(9, "Giza")).await;
    assert_eq!(record.status, FulfillmentStatus::PendingRetry);
    assert!(record.delivery.is_none());
    assert!(record.carrier_error.is_some());

    mock.create_succeeds.store(true, Ordering::SeqCst);
    let record = fulfillment::retry(&state, 9).await.unwrap();
    assert_eq!(record.status, FulfillmentStatus::Created);
    assert_eq!(
        record.delivery.unwrap().tracking_number,
        "TRK12345"
    );
}

#[tokio::test]
async fn failed_carrier_cancel_still_cancels_locally() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock.clone()).await;
    let metrics = Metrics::new();
    let client = client_for(addr, 3600);
    let state = AppState::new(client, metrics);

    let record = fulfillment::create_for_order(&state, cod_order(10, "Giza")).await;
    assert_eq!(record.status, FulfillmentStatus::Created);

    mock.cancel_succeeds.store(false, Ordering::SeqCst);
    let record = fulfillment::cancel_order(&state, 10).await.unwrap();

    assert_eq!(record.status, FulfillmentStatus::Cancelled);
    let carrier_error = record.carrier_error.expect("failed cancel must be recorded");
    assert!(carrier_error.contains("already picked up"));
}

#[tokio::test]
async fn pickup_location_is_cached_until_invalidated() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock.clone()).await;
    let client = client_for(addr, 3600);

    let first = client.default_location().await.unwrap();
    let second = client.default_location().await.unwrap();

    // The default-flagged entry wins even when it is not first in the list.
    assert_eq!(first.location_name, "Main Warehouse");
    assert_eq!(first.city, "Cairo");
    assert!(first.is_default);
    assert_eq!(second.location_id, first.location_id);
    assert_eq!(mock.pickup_calls.load(Ordering::SeqCst), 1);

    client.invalidate_pickup_cache().await;
    client.default_location().await.unwrap();
    assert_eq!(mock.pickup_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn tracking_reports_carrier_state() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock.clone()).await;
    let client = client_for(addr, 3600);

    let status = client.track_delivery("TRK12345").await.unwrap();

    assert_eq!(status.tracking_number.as_deref(), Some("TRK12345"));
    assert_eq!(status.status.as_deref(), Some("In transit"));
    assert_eq!(status.status_code, Some(30));
}

// REST facade, exercised through the router the way the storefront calls it.

async fn gateway(addr: SocketAddr) -> Router {
    let metrics = Metrics::new();
    let client = client_for(addr, 3600);
    bosta_gateway::api::rest::router(Arc::new(AppState::new(client, metrics)))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock).await;
    let app = gateway(addr).await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["fulfillments"], 0);
    assert_eq!(body["pending_retry"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock).await;
    let app = gateway(addr).await;

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn cities_endpoint_lists_directory() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock).await;
    let app = gateway(addr).await;

    let response = app.oneshot(get_request("/cities")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let cities = body.as_array().unwrap();
    assert_eq!(cities.len(), 28);
    assert!(cities.iter().any(|c| c["name"] == "Cairo" && c["code"] == "EG-01"));
}

#[tokio::test]
async fn quote_endpoint_reports_unavailable_for_unknown_city() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock.clone()).await;
    let app = gateway(addr).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/quotes",
            json!({ "pickup_city": "Cairo", "dropoff_city": "Atlantis", "cod_amount": 0.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["available"], false);
    assert_eq!(mock.pricing_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn quote_endpoint_returns_priced_quote() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock).await;
    let app = gateway(addr).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/quotes",
            json!({ "pickup_city": "Cairo", "dropoff_city": "Giza", "cod_amount": 1000.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["available"], true);
    assert_eq!(body["quote"]["total"], 62.0);
    assert_eq!(body["quote"]["currency"], "EGP");
}

#[tokio::test]
async fn fulfillment_endpoint_creates_and_cancels() {
    let mock = MockCarrier::new();
    let addr = spawn_mock(mock).await;
    let app = gateway(addr).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/fulfillments",
            serde_json::to_value(cod_order(11, "Giza")).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Created");
    assert_eq!(body["delivery"]["tracking_number"], "TRK12345");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/fulfillments/11")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Cancelled");

    let response = app.oneshot(get_request("/fulfillments/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

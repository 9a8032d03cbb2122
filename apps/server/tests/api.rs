//! HTTP tests driving the router directly, no socket involved.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use oaxaca_db::{Database, DbConfig};
use oaxaca_server::{build_router, AppState, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app_with_tables(tables: u32) -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.tables().provision(tables).await.unwrap();
    build_router(AppState::new(db, ServerConfig::default()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(serde_json::to_vec(&json).unwrap()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app_with_tables(1).await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
}

#[tokio::test]
async fn test_service_walkthrough() {
    let app = app_with_tables(3).await;

    let (status, waiter) = send(
        &app,
        "POST",
        "/staff",
        Some(json!({"name": "Rosa", "staffType": "waiter"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let staff_id = waiter["staffId"].as_i64().unwrap();

    let (_, ana) = send(&app, "POST", "/customer", Some(json!({"name": "Ana"}))).await;
    assert_eq!(ana["tableNumber"], 1);
    let (_, ben) = send(
        &app,
        "POST",
        "/customer",
        Some(json!({"name": "Ben", "allergies": "nuts"})),
    )
    .await;
    assert_eq!(ben["tableNumber"], 2);

    let (status, pass) = send(&app, "POST", "/table/assign-waiter", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pass["outcome"], "assigned");
    assert_eq!(pass["assignments"][0]["tableNumber"], 1);
    assert_eq!(pass["tables"][0]["state"], "OCCUPIED_STAFFED");

    let (_, assigned) = send(
        &app,
        "GET",
        &format!("/table/view-assigned?staffId={}", staff_id),
        None,
    )
    .await;
    assert_eq!(assigned.as_array().unwrap().len(), 1);

    let (status, order) = send(
        &app,
        "POST",
        "/order",
        Some(json!({
            "customerId": ana["customerId"],
            "items": [{"dishName": "Memelas", "quantity": 3}],
            "totalPriceCents": 1350
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "pending");

    let (status, payment) = send(
        &app,
        "POST",
        "/payment",
        Some(json!({
            "tableNumber": 1,
            "amountCents": 1350,
            "cardNumber": "4242 4242 4242 4242",
            "cardHolder": "Ana",
            "cardExpiry": "08/28"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["cardLast4"], "4242");
    assert!(payment.get("cardNumber").is_none());

    let (_, board) = send(&app, "GET", "/table/status", None).await;
    assert_eq!(board[0]["customerName"], "Ana");
    assert_eq!(board[0]["paid"], true);

    let (status, cleared) = send(
        &app,
        "POST",
        "/table/clear",
        Some(json!({"tableNumber": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["cleared"], true);
    assert_eq!(cleared["ordersRemoved"], 1);
    assert_eq!(cleared["paymentsRemoved"], 1);

    let (_, tables) = send(&app, "GET", "/table", None).await;
    assert_eq!(tables[0]["state"], "FREE");
    assert_eq!(tables[1]["state"], "OCCUPIED_UNSTAFFED");

    let (_, payments) = send(&app, "GET", "/payment/get-info?tableNumber=1", None).await;
    assert!(payments.as_array().unwrap().is_empty());
    let (_, orders) = send(&app, "GET", "/order/fetch-all", None).await;
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_full_floor_is_retryable() {
    let app = app_with_tables(1).await;

    send(&app, "POST", "/customer", Some(json!({"name": "Ana"}))).await;
    let (status, body) = send(&app, "POST", "/customer", Some(json!({"name": "Ben"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "NO_CAPACITY");
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_unseated_customer_can_be_seated_later() {
    let app = app_with_tables(1).await;

    send(&app, "POST", "/customer", Some(json!({"name": "Ana"}))).await;
    let (status, body) = send(&app, "POST", "/customer", Some(json!({"name": "Ben"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "NO_CAPACITY");
    let ben_id = body["customerId"].as_i64().unwrap();

    let (status, _) = send(&app, "POST", "/table/clear", Some(json!({"tableNumber": 1}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, seated) = send(
        &app,
        "POST",
        "/table/assign",
        Some(json!({"customerId": ben_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seated["tableNumber"], 1);

    let (_, tables) = send(&app, "GET", "/table", None).await;
    assert_eq!(tables[0]["customerId"], ben_id);
}

#[tokio::test]
async fn test_waiter_pass_without_waiters() {
    let app = app_with_tables(2).await;
    send(&app, "POST", "/customer", Some(json!({"name": "Ana"}))).await;

    let (status, body) = send(&app, "POST", "/table/assign-waiter", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "no_available_waiters");
    assert_eq!(body["tables"][0]["state"], "OCCUPIED_UNSTAFFED");
}

#[tokio::test]
async fn test_client_errors() {
    let app = app_with_tables(2).await;

    let (status, body) = send(&app, "POST", "/table/clear", Some(json!({"tableNumber": 9}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = send(&app, "POST", "/customer", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["retryable"], false);

    let (status, _) = send(&app, "POST", "/table/assign", Some(json!({"customerId": 42}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_transitions() {
    let app = app_with_tables(2).await;
    let (_, ana) = send(&app, "POST", "/customer", Some(json!({"name": "Ana"}))).await;
    let (_, order) = send(
        &app,
        "POST",
        "/order",
        Some(json!({
            "customerId": ana["customerId"],
            "items": [{"dishName": "Tejate", "quantity": 1}],
            "totalPriceCents": 400
        })),
    )
    .await;
    let order_id = &order["orderId"];

    let (status, delivered) = send(
        &app,
        "POST",
        "/order/mark-delivered",
        Some(json!({"orderId": order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["status"], "delivered");

    let (status, body) = send(
        &app,
        "POST",
        "/order/cancel-order",
        Some(json!({"orderId": order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");
}

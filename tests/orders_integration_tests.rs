mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, patch, post},
    Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::{json, Value};
use tower::ServiceExt;

use fieldforce_backend::entities::{order_sequences, prelude::OrderSequences};
use fieldforce_backend::error::ServiceError;
use fieldforce_backend::handlers::{contacts, orders};
use fieldforce_backend::services::order_numbers::{
    extract_sequence, extract_year, is_valid_order_number, next_order_number, MAX_SEQUENCE,
};
use fieldforce_backend::services::{notifications::NotificationService, otp::OtpService};
use fieldforce_backend::AppState;

use crate::common::setup_test_db;

async fn create_test_app_state() -> AppState {
    let db = setup_test_db().await.expect("Failed to connect to test DB");

    // Unconfigured providers: reminder/OTP sends fail fast without network
    let notifications =
        NotificationService::new(String::new(), String::new(), "TEST".to_string());
    let otp = OtpService::new(String::new(), String::new());

    AppState {
        db,
        notifications,
        otp,
    }
}

async fn build_test_router() -> Router {
    let state = create_test_app_state().await;

    Router::new()
        .route(
            "/contacts",
            post(contacts::create_contact).get(contacts::list_contacts),
        )
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route(
            "/orders/{id}",
            get(orders::get_order).patch(orders::update_order),
        )
        .route("/orders/{id}/status", patch(orders::update_order_status))
        .route("/orders/{id}/cancel", post(orders::cancel_order))
        .route("/orders/{id}/payments", post(orders::record_payment))
        .with_state(state)
}

async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    let request = match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn create_contact(app: &Router) -> i64 {
    let (status, body) = request_json(
        app,
        "POST",
        "/contacts",
        Some(json!({
            "name": "Asha Traders",
            "phone": "+919876543210"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_order(app: &Router, contact_id: i64) -> Value {
    let (status, body) = request_json(
        app,
        "POST",
        "/orders",
        Some(json!({
            "contactId": contact_id,
            "totalAmount": "1000.00",
            "dueDate": "2026-08-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create order failed: {body}");
    body
}

async fn transition(app: &Router, order_id: i64, target: &str) -> (StatusCode, Value) {
    request_json(
        app,
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(json!({ "status": target })),
    )
    .await
}

#[tokio::test]
async fn test_created_order_has_well_formed_number() {
    let app = build_test_router().await;
    let contact_id = create_contact(&app).await;

    let order = create_order(&app, contact_id).await;

    let number = order["orderNumber"].as_str().unwrap();
    assert!(
        is_valid_order_number(number),
        "unexpected order number format: {number}"
    );
    assert_eq!(extract_year(number), Some(Utc::now().year()));
    assert_eq!(order["status"], "DRAFT");
    assert_eq!(order["paymentStatus"], "UNPAID");
}

#[tokio::test]
async fn test_order_numbers_increase_within_year() {
    let app = build_test_router().await;
    let contact_id = create_contact(&app).await;

    let first = create_order(&app, contact_id).await;
    let second = create_order(&app, contact_id).await;

    let first_seq = extract_sequence(first["orderNumber"].as_str().unwrap()).unwrap();
    let second_seq = extract_sequence(second["orderNumber"].as_str().unwrap()).unwrap();
    assert!(
        second_seq > first_seq,
        "sequences not increasing: {first_seq} then {second_seq}"
    );
}

/// Idempotent: resets the counter row so repeated suite runs start from the
/// same state.
async fn seed_sequence(db: &DatabaseConnection, year: i32, last_value: i32) {
    match OrderSequences::find_by_id(year).one(db).await.unwrap() {
        Some(row) => {
            let mut active: order_sequences::ActiveModel = row.into();
            active.last_value = Set(last_value);
            active.update(db).await.unwrap();
        }
        None => {
            order_sequences::ActiveModel {
                year: Set(year),
                last_value: Set(last_value),
                ..Default::default()
            }
            .insert(db)
            .await
            .unwrap();
        }
    }
}

#[tokio::test]
async fn test_exhausted_year_sequence_is_rejected() {
    let db = setup_test_db().await.expect("Failed to connect to test DB");

    // A year no other test allocates from, one slot below the ceiling
    seed_sequence(&db, 1986, MAX_SEQUENCE - 1).await;

    // The last slot of the year still allocates
    let number = next_order_number(&db, NaiveDate::from_ymd_opt(1986, 6, 15).unwrap())
        .await
        .expect("last sequence slot must allocate");
    assert_eq!(number, "ORD-1986-99999");

    // The next allocation must refuse to overflow the 5-digit space
    let err = next_order_number(&db, NaiveDate::from_ymd_opt(1986, 6, 16).unwrap())
        .await
        .expect_err("allocation past the ceiling must fail");
    match err {
        ServiceError::SequenceExhausted(year) => assert_eq!(year, 1986),
        other => panic!("expected SequenceExhausted, got {other:?}"),
    }

    // The failed allocation must leave the counter untouched
    let row = OrderSequences::find_by_id(1986)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.last_value, MAX_SEQUENCE);
}

#[tokio::test]
async fn test_happy_path_transition_succeeds() {
    let app = build_test_router().await;
    let contact_id = create_contact(&app).await;
    let order = create_order(&app, contact_id).await;
    let order_id = order["id"].as_i64().unwrap();

    let (status, body) = transition(&app, order_id, "PENDING").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PENDING");
}

#[tokio::test]
async fn test_skipping_states_returns_400_and_leaves_order_unchanged() {
    let app = build_test_router().await;
    let contact_id = create_contact(&app).await;
    let order = create_order(&app, contact_id).await;
    let order_id = order["id"].as_i64().unwrap();

    let (status, _) = transition(&app, order_id, "PENDING").await;
    assert_eq!(status, StatusCode::OK);

    // PENDING -> DELIVERED skips APPROVED and DISPATCHED
    let (status, body) = transition(&app, order_id, "DELIVERED").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");
    assert!(body["error"].as_str().unwrap().contains("PENDING"));

    let (status, body) = request_json(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PENDING", "stored status must be unchanged");
}

#[tokio::test]
async fn test_unknown_status_value_is_rejected() {
    let app = build_test_router().await;
    let contact_id = create_contact(&app).await;
    let order = create_order(&app, contact_id).await;
    let order_id = order["id"].as_i64().unwrap();

    let (status, body) = transition(&app, order_id, "SHIPPED").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_cancel_requires_reason() {
    let app = build_test_router().await;
    let contact_id = create_contact(&app).await;
    let order = create_order(&app, contact_id).await;
    let order_id = order["id"].as_i64().unwrap();

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/orders/{order_id}/cancel"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/orders/{order_id}/cancel"),
        Some(json!({ "reason": "customer withdrew the purchase" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(body["cancellationReason"], "customer withdrew the purchase");
}

#[tokio::test]
async fn test_cancel_after_dispatch_is_rejected() {
    let app = build_test_router().await;
    let contact_id = create_contact(&app).await;
    let order = create_order(&app, contact_id).await;
    let order_id = order["id"].as_i64().unwrap();

    for step in ["PENDING", "APPROVED", "DISPATCHED"] {
        let (status, _) = transition(&app, order_id, step).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/orders/{order_id}/cancel"),
        Some(json!({ "reason": "too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_content_edit_locked_after_draft() {
    let app = build_test_router().await;
    let contact_id = create_contact(&app).await;
    let order = create_order(&app, contact_id).await;
    let order_id = order["id"].as_i64().unwrap();

    // Editable while DRAFT
    let (status, body) = request_json(
        &app,
        "PATCH",
        &format!("/orders/{order_id}"),
        Some(json!({ "notes": "deliver before noon" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "deliver before noon");

    let (status, _) = transition(&app, order_id, "PENDING").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request_json(
        &app,
        "PATCH",
        &format!("/orders/{order_id}"),
        Some(json!({ "notes": "changed my mind" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_payment_recording_updates_payment_status() {
    let app = build_test_router().await;
    let contact_id = create_contact(&app).await;
    let order = create_order(&app, contact_id).await;
    let order_id = order["id"].as_i64().unwrap();

    // Payments are rejected while DRAFT
    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/orders/{order_id}/payments"),
        Some(json!({ "amount": "400.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = transition(&app, order_id, "PENDING").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/orders/{order_id}/payments"),
        Some(json!({ "amount": "400.00", "method": "CASH" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["paymentStatus"], "PARTIAL");

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/orders/{order_id}/payments"),
        Some(json!({ "amount": "600.00", "method": "TRANSFER" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["paymentStatus"], "PAID");
    assert_eq!(body["payments"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_order_returns_404() {
    let app = build_test_router().await;

    let (status, body) = request_json(&app, "GET", "/orders/999999999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_orders_filters_by_status() {
    let app = build_test_router().await;
    let contact_id = create_contact(&app).await;
    let order = create_order(&app, contact_id).await;
    let order_id = order["id"].as_i64().unwrap();

    let (status, body) = request_json(&app, "GET", "/orders?status=DRAFT&perPage=100", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["orders"].as_array().unwrap();
    assert!(listed.iter().all(|o| o["status"] == "DRAFT"));
    assert!(listed.iter().any(|o| o["id"].as_i64() == Some(order_id)));
}

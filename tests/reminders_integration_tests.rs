mod common;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

use fieldforce_backend::entities::{contacts, orders, payment_reminders, prelude::*};
use fieldforce_backend::services::notifications::NotificationService;
use fieldforce_backend::services::order_status::{payment_status, OrderStatus};
use fieldforce_backend::services::reminders::run_payment_reminders;

use crate::common::setup_test_db;

/// Insert a delivered, unpaid order whose due date lies `days_overdue` days
/// before `now`, bypassing the HTTP layer.
async fn seed_overdue_order(
    db: &sea_orm::DatabaseConnection,
    order_number: &str,
    days_overdue: i64,
    now: chrono::DateTime<Utc>,
) -> orders::Model {
    let contact = contacts::ActiveModel {
        name: Set("Meridian Stores".to_string()),
        phone: Set(Some("+919812345678".to_string())),
        created_at: Set(Some(now.naive_utc())),
        updated_at: Set(Some(now.naive_utc())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to seed contact");

    orders::ActiveModel {
        order_number: Set(order_number.to_string()),
        contact_id: Set(contact.id),
        status: Set(OrderStatus::Delivered.as_str().to_string()),
        total_amount: Set(dec!(1000)),
        due_date: Set(Some((now - Duration::days(days_overdue)).date_naive())),
        payment_status: Set(payment_status::UNPAID.to_string()),
        created_at: Set(Some(now.naive_utc())),
        updated_at: Set(Some(now.naive_utc())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to seed order")
}

async fn reminder_count(db: &sea_orm::DatabaseConnection, order_id: i32) -> u64 {
    PaymentReminders::find()
        .filter(payment_reminders::Column::OrderId.eq(order_id))
        .count(db)
        .await
        .expect("failed to count reminders")
}

#[tokio::test]
async fn test_scan_sends_once_per_day_on_weekly_anniversary() {
    let db = setup_test_db().await.expect("Failed to connect to test DB");
    // Unconfigured provider: the attempt is recorded as a per-order failure
    let notifications = NotificationService::new(String::new(), String::new(), "TEST".to_string());

    let now = Utc::now();
    let suffix = now.timestamp_subsec_micros();
    let number = format!("ORD-1990-{:05}", suffix % 100_000);
    let order = seed_overdue_order(&db, &number, 14, now).await;

    let summary = run_payment_reminders(&db, &notifications, now)
        .await
        .expect("scan failed");

    let detail = summary
        .details
        .iter()
        .find(|d| d.order_id == order.id)
        .expect("order 14 days overdue must be processed");
    assert_eq!(detail.days_pending, 14);
    assert_eq!(detail.outstanding_amount, dec!(1000));
    assert!(!detail.success, "unconfigured provider cannot succeed");
    assert_eq!(reminder_count(&db, order.id).await, 1);

    // Second run on the same day must not add a second audit row
    let summary = run_payment_reminders(&db, &notifications, now)
        .await
        .expect("second scan failed");
    assert!(summary.details.iter().all(|d| d.order_id != order.id));
    assert_eq!(reminder_count(&db, order.id).await, 1);

    // Failed attempts still leave a full audit trail
    let row = PaymentReminders::find()
        .filter(payment_reminders::Column::OrderId.eq(order.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.channel, "SMS");
    assert!(!row.success);
    assert!(row.error.is_some());
    assert!(row.message.as_deref().unwrap_or("").contains(&number));
}

#[tokio::test]
async fn test_scan_skips_orders_off_the_weekly_cadence() {
    let db = setup_test_db().await.expect("Failed to connect to test DB");
    let notifications = NotificationService::new(String::new(), String::new(), "TEST".to_string());

    let now = Utc::now();
    let suffix = now.timestamp_subsec_micros();
    let number = format!("ORD-1991-{:05}", suffix % 100_000);
    let order = seed_overdue_order(&db, &number, 10, now).await;

    run_payment_reminders(&db, &notifications, now)
        .await
        .expect("scan failed");

    // 10 is not a multiple of 7: scanned but no reminder attempted
    assert_eq!(reminder_count(&db, order.id).await, 0);
}

#[tokio::test]
async fn test_scan_skips_settled_orders() {
    let db = setup_test_db().await.expect("Failed to connect to test DB");
    let notifications = NotificationService::new(String::new(), String::new(), "TEST".to_string());

    let now = Utc::now();
    let suffix = now.timestamp_subsec_micros();
    let number = format!("ORD-1992-{:05}", suffix % 100_000);
    let order = seed_overdue_order(&db, &number, 7, now).await;

    // Payment arrived after the order was flagged, payment_status not yet
    // recomputed: the scan must notice the settled balance on its own
    fieldforce_backend::entities::payments::ActiveModel {
        order_id: Set(order.id),
        amount: Set(dec!(1000)),
        paid_at: Set(now.naive_utc()),
        created_at: Set(Some(now.naive_utc())),
        ..Default::default()
    }
    .insert(&db)
    .await
    .expect("failed to seed payment");

    run_payment_reminders(&db, &notifications, now)
        .await
        .expect("scan failed");

    assert_eq!(reminder_count(&db, order.id).await, 0);
}

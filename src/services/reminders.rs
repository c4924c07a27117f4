//! Overdue payment reminders
//!
//! A delivered order with an unpaid or partially paid balance becomes a
//! reminder candidate once its due date has passed. Reminders fire on day
//! 7, 14, 21, ... of overdue status, at most once per calendar day per
//! order. Every delivery attempt is logged to payment_reminders whether or
//! not the provider accepted it.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::entities::{contacts, orders, payment_reminders, payments, prelude::*};
use crate::error::ServiceError;
use crate::models::reminder::{ReminderDetail, ReminderRunSummary};
use crate::services::notifications::{NotificationChannel, NotificationService};
use crate::services::order_status::{payment_status, OrderStatus};

pub const REMINDER_INTERVAL_DAYS: i64 = 7;

pub fn days_pending(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - due_date).num_days()
}

/// Reminders fire only on whole-week anniversaries of the due date, never
/// on the due date itself.
pub fn is_reminder_due(days_pending: i64) -> bool {
    days_pending > 0 && days_pending % REMINDER_INTERVAL_DAYS == 0
}

pub fn outstanding_amount(total: Decimal, paid: &[payments::Model]) -> Decimal {
    total - paid.iter().map(|p| p.amount).sum::<Decimal>()
}

pub fn compose_reminder_message(
    contact_name: &str,
    outstanding: Decimal,
    order_number: &str,
    days_pending: i64,
) -> String {
    format!(
        "Dear {contact_name}, payment of {outstanding:.2} for order {order_number} \
         is overdue by {days_pending} days. Kindly arrange payment at the earliest. Thank you."
    )
}

/// Scan all overdue orders and send the reminders that are due today.
///
/// A failure to load the candidate list is fatal and propagates; any
/// failure after that is recorded per order and the scan continues.
pub async fn run_payment_reminders(
    db: &DatabaseConnection,
    notifications: &NotificationService,
    now: DateTime<Utc>,
) -> Result<ReminderRunSummary, ServiceError> {
    let today = now.date_naive();
    let candidates = overdue_candidates(db, today).await?;

    let mut summary = ReminderRunSummary {
        scanned: candidates.len() as u64,
        sent: 0,
        errors: 0,
        details: Vec::new(),
    };

    for order in candidates {
        let Some(due_date) = order.due_date else {
            continue;
        };
        let days = days_pending(due_date, today);
        if !is_reminder_due(days) {
            continue;
        }

        match process_candidate(db, notifications, &order, days, now).await {
            Ok(Some(detail)) => {
                if detail.success {
                    summary.sent += 1;
                } else {
                    summary.errors += 1;
                }
                summary.details.push(detail);
            }
            Ok(None) => {
                // Balance settled since it was flagged, or already reminded today
            }
            Err(e) => {
                tracing::error!(
                    order_id = order.id,
                    order_number = %order.order_number,
                    "Failed to process reminder candidate: {}",
                    e
                );
                summary.errors += 1;
                summary.details.push(ReminderDetail {
                    order_id: order.id,
                    order_number: order.order_number.clone(),
                    contact_name: String::new(),
                    outstanding_amount: Decimal::ZERO,
                    days_pending: days,
                    success: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Ok(summary)
}

/// Manual trigger for a single order. Skips the weekly cadence and the
/// once-per-day guard, but still requires a delivered order with money
/// outstanding, and still writes the audit row.
pub async fn send_manual_reminder(
    db: &DatabaseConnection,
    notifications: &NotificationService,
    order_id: i32,
    now: DateTime<Utc>,
) -> Result<ReminderDetail, ServiceError> {
    let order = Orders::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound {
            entity: "order",
            id: order_id,
        })?;

    if OrderStatus::parse(&order.status)? != OrderStatus::Delivered {
        return Err(ServiceError::validation(
            "reminders can only be sent for delivered orders",
        ));
    }

    let paid = payments_for(db, order.id).await?;
    let outstanding = outstanding_amount(order.total_amount, &paid);
    if outstanding <= Decimal::ZERO {
        return Err(ServiceError::validation(
            "order has no outstanding balance",
        ));
    }

    let today = now.date_naive();
    let days = order
        .due_date
        .map(|due| days_pending(due, today).max(0))
        .unwrap_or(0);

    let contact = contact_for(db, &order).await?;
    attempt_delivery(db, notifications, &order, &contact, outstanding, days, now).await
}

async fn overdue_candidates(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Vec<orders::Model>, ServiceError> {
    Orders::find()
        .filter(orders::Column::Status.eq(OrderStatus::Delivered.as_str()))
        .filter(
            orders::Column::PaymentStatus
                .is_in([payment_status::UNPAID, payment_status::PARTIAL]),
        )
        .filter(orders::Column::DueDate.lt(today))
        .all(db)
        .await
        .map_err(Into::into)
}

async fn process_candidate(
    db: &DatabaseConnection,
    notifications: &NotificationService,
    order: &orders::Model,
    days: i64,
    now: DateTime<Utc>,
) -> Result<Option<ReminderDetail>, ServiceError> {
    let today = now.date_naive();

    if already_reminded_today(db, order.id, today).await? {
        tracing::debug!(
            order_id = order.id,
            order_number = %order.order_number,
            "Reminder already sent today, skipping"
        );
        return Ok(None);
    }

    let paid = payments_for(db, order.id).await?;
    let outstanding = outstanding_amount(order.total_amount, &paid);
    if outstanding <= Decimal::ZERO {
        return Ok(None);
    }

    let contact = contact_for(db, order).await?;
    let detail =
        attempt_delivery(db, notifications, order, &contact, outstanding, days, now).await?;
    Ok(Some(detail))
}

async fn already_reminded_today(
    db: &DatabaseConnection,
    order_id: i32,
    today: NaiveDate,
) -> Result<bool, ServiceError> {
    let existing = PaymentReminders::find()
        .filter(payment_reminders::Column::OrderId.eq(order_id))
        .filter(payment_reminders::Column::SentDate.eq(today))
        .one(db)
        .await?;
    Ok(existing.is_some())
}

async fn payments_for(
    db: &DatabaseConnection,
    order_id: i32,
) -> Result<Vec<payments::Model>, ServiceError> {
    Payments::find()
        .filter(payments::Column::OrderId.eq(order_id))
        .all(db)
        .await
        .map_err(Into::into)
}

async fn contact_for(
    db: &DatabaseConnection,
    order: &orders::Model,
) -> Result<contacts::Model, ServiceError> {
    Contacts::find_by_id(order.contact_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound {
            entity: "contact",
            id: order.contact_id,
        })
}

/// Destination for the channel: phone for SMS/WhatsApp, email for EMAIL
fn destination_for(contact: &contacts::Model, channel: NotificationChannel) -> Option<&String> {
    match channel {
        NotificationChannel::Sms | NotificationChannel::Whatsapp => contact.phone.as_ref(),
        NotificationChannel::Email => contact.email.as_ref(),
    }
}

/// Attempt delivery over the configured channel and record the audit row
/// regardless of the outcome. A missing destination or unconfigured
/// provider is a non-retryable per-order failure, not a batch failure.
async fn attempt_delivery(
    db: &DatabaseConnection,
    notifications: &NotificationService,
    order: &orders::Model,
    contact: &contacts::Model,
    outstanding: Decimal,
    days: i64,
    now: DateTime<Utc>,
) -> Result<ReminderDetail, ServiceError> {
    let channel = notifications.default_channel();
    let destination = destination_for(contact, channel).cloned();
    let message = compose_reminder_message(&contact.name, outstanding, &order.order_number, days);

    let (success, provider_message_id, raw_response, error) = match &destination {
        None => (
            false,
            None,
            None,
            Some(format!(
                "contact has no destination for channel {}",
                channel.as_str()
            )),
        ),
        Some(_) if !notifications.is_configured() => (
            false,
            None,
            None,
            Some("notification provider not configured".to_string()),
        ),
        Some(dest) => match notifications.send_message(dest, &message, channel).await {
            Ok(outcome) => {
                let error = if outcome.success {
                    None
                } else {
                    Some("provider rejected message".to_string())
                };
                (
                    outcome.success,
                    outcome.provider_message_id,
                    Some(outcome.raw_response),
                    error,
                )
            }
            Err(e) => (false, None, None, Some(e.to_string())),
        },
    };

    payment_reminders::ActiveModel {
        order_id: Set(order.id),
        channel: Set(channel.as_str().to_string()),
        destination: Set(destination),
        message: Set(Some(message)),
        success: Set(success),
        provider_message_id: Set(provider_message_id),
        raw_response: Set(raw_response),
        error: Set(error.clone()),
        sent_date: Set(now.date_naive()),
        sent_at: Set(now.naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if success {
        tracing::info!(
            order_id = order.id,
            order_number = %order.order_number,
            days_pending = days,
            "Payment reminder sent"
        );
    } else {
        tracing::warn!(
            order_id = order.id,
            order_number = %order.order_number,
            error = error.as_deref().unwrap_or("unknown"),
            "Payment reminder failed"
        );
    }

    Ok(ReminderDetail {
        order_id: order.id,
        order_number: order.order_number.clone(),
        contact_name: contact.name.clone(),
        outstanding_amount: outstanding,
        days_pending: days,
        success,
        error,
    })
}

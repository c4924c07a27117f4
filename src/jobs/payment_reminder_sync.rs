use chrono::Utc;
use sea_orm::DatabaseConnection;
use tokio::time::{interval, Duration};

use crate::error::ServiceError;
use crate::services::notifications::NotificationService;
use crate::services::reminders::run_payment_reminders;

pub async fn start_payment_reminder_job(
    db: DatabaseConnection,
    notifications: NotificationService,
) {
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(86400)); // Every 24 hours

        // Run immediately on startup
        tracing::info!("Running initial overdue payment reminder scan");
        if let Err(e) = scan_and_log(&db, &notifications).await {
            tracing::error!("Failed to run payment reminder scan on startup: {}", e);
        }

        loop {
            interval.tick().await;
            tracing::info!("Starting scheduled overdue payment reminder scan");

            if let Err(e) = scan_and_log(&db, &notifications).await {
                tracing::error!("Failed to run payment reminder scan: {}", e);
            }
        }
    });
}

async fn scan_and_log(
    db: &DatabaseConnection,
    notifications: &NotificationService,
) -> Result<(), ServiceError> {
    let summary = run_payment_reminders(db, notifications, Utc::now()).await?;

    tracing::info!(
        "Payment reminder scan complete: {} overdue orders scanned, {} reminders sent, {} errors",
        summary.scanned,
        summary.sent,
        summary.errors
    );

    for detail in summary.details.iter().filter(|d| !d.success) {
        tracing::warn!(
            order_number = %detail.order_number,
            error = detail.error.as_deref().unwrap_or("unknown"),
            "Reminder not delivered"
        );
    }

    Ok(())
}

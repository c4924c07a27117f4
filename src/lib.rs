// src/lib.rs

use sea_orm::DatabaseConnection;
use services::{notifications::NotificationService, otp::OtpService};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub notifications: NotificationService,
    pub otp: OtpService,
}

pub mod entities {
    pub mod prelude;
    pub mod contacts;
    pub mod order_sequences;
    pub mod orders;
    pub mod payment_reminders;
    pub mod payments;
}

pub mod services {
    pub mod notifications;
    pub mod order_numbers;
    pub mod order_status;
    pub mod otp;
    pub mod reminders;
}

pub mod models {
    pub mod auth;
    pub mod contact;
    pub mod order;
    pub mod reminder;
}

pub mod handlers {
    pub mod auth;
    pub mod contacts;
    pub mod orders;
}

pub mod error;
pub mod jobs;

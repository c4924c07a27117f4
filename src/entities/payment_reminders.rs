//! `SeaORM` Entity for payment_reminders
//!
//! Append-only audit log of reminder delivery attempts, successful or not.
//! `sent_date` backs the at-most-one-reminder-per-order-per-day guard.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_reminders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_id: i32,
    /// SMS, EMAIL or WHATSAPP
    pub channel: String,
    pub destination: Option<String>,
    pub message: Option<String>,
    pub success: bool,
    pub provider_message_id: Option<String>,
    /// Raw provider response body (or the local error) kept for audit
    pub raw_response: Option<String>,
    pub error: Option<String>,
    pub sent_date: Date,
    pub sent_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

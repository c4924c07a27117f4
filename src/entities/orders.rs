//! `SeaORM` Entity for orders
//!
//! Orders carry a human-readable `order_number` (`ORD-<year>-<5 digits>`,
//! assigned once at creation) and a status that only changes through
//! validated lifecycle transitions. Orders are never deleted; cancellation
//! is a terminal status.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Immutable, unique, format ORD-{year}-{5-digit sequence}
    #[sea_orm(unique)]
    pub order_number: String,
    pub contact_id: i32,
    /// Lifecycle status: DRAFT, PENDING, APPROVED, DISPATCHED, DELIVERED,
    /// CANCELLED, REJECTED
    pub status: String,
    pub total_amount: Decimal,
    pub due_date: Option<Date>,
    /// UNPAID, PARTIAL or PAID, recomputed as payments are recorded
    pub payment_status: String,
    pub notes: Option<String>,
    pub delivery_address: Option<String>,
    /// Required when status is CANCELLED
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

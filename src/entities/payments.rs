//! `SeaORM` Entity for payments
//!
//! Append-only: a payment records an amount received against an order and
//! is never mutated after insertion.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_id: i32,
    pub amount: Decimal,
    /// e.g. CASH, TRANSFER, CHEQUE
    pub method: Option<String>,
    /// External payment reference (bank transaction id, cheque number)
    pub reference: Option<String>,
    pub paid_at: DateTime,
    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

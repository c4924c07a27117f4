//! Year-scoped sequential order numbers
//!
//! Numbers look like `ORD-2026-00042`. Allocation goes through a per-year
//! counter row updated under a row lock inside a transaction, so two
//! concurrent creations cannot observe the same last value. The counter
//! resets implicitly each year: the first order of a new year inserts a
//! fresh row starting at 1.

use chrono::{Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};

use crate::entities::{order_sequences, prelude::*};
use crate::error::ServiceError;

pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Five decimal digits; the year's number space ends here
pub const MAX_SEQUENCE: i32 = 99_999;

lazy_static! {
    static ref ORDER_NUMBER_RE: Regex = Regex::new(r"^ORD-\d{4}-\d{5}$").unwrap();
}

pub fn format_order_number(year: i32, sequence: i32) -> String {
    format!("{ORDER_NUMBER_PREFIX}-{year}-{sequence:05}")
}

/// Format predicate used for auditing and tests, not invariant enforcement
pub fn is_valid_order_number(value: &str) -> bool {
    ORDER_NUMBER_RE.is_match(value)
}

pub fn extract_year(value: &str) -> Option<i32> {
    if !is_valid_order_number(value) {
        return None;
    }
    value[4..8].parse().ok()
}

pub fn extract_sequence(value: &str) -> Option<i32> {
    if !is_valid_order_number(value) {
        return None;
    }
    value[9..14].parse().ok()
}

/// Allocate the next order number for the given calendar date.
///
/// The counter row for the year is read with SELECT ... FOR UPDATE so a
/// concurrent allocation blocks until this transaction commits. Two
/// first-of-year creations can still race on the insert; the primary key on
/// `year` turns the loser into a database error rather than a duplicate
/// order number.
pub async fn next_order_number(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<String, ServiceError> {
    let year = today.year();
    let txn = db.begin().await?;

    let existing = OrderSequences::find()
        .filter(order_sequences::Column::Year.eq(year))
        .lock_exclusive()
        .one(&txn)
        .await?;

    let sequence = match existing {
        Some(row) => {
            let next = row.last_value + 1;
            if next > MAX_SEQUENCE {
                // Dropping the transaction rolls the lock back
                return Err(ServiceError::SequenceExhausted(year));
            }
            let mut active: order_sequences::ActiveModel = row.into();
            active.last_value = Set(next);
            active.updated_at = Set(Some(Utc::now().naive_utc()));
            active.update(&txn).await?;
            next
        }
        None => {
            order_sequences::ActiveModel {
                year: Set(year),
                last_value: Set(1),
                updated_at: Set(Some(Utc::now().naive_utc())),
            }
            .insert(&txn)
            .await?;
            1
        }
    };

    txn.commit().await?;
    Ok(format_order_number(year, sequence))
}

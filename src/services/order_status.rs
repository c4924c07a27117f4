//! Order lifecycle state machine
//!
//! Forward transitions are strictly sequential along the happy path
//! (DRAFT -> PENDING -> APPROVED -> DISPATCHED -> DELIVERED); skipping a
//! state is rejected. Cancellation is only reachable before dispatch and
//! requires a reason, so it goes through the dedicated cancel operation
//! rather than a plain status update. Rejection is an approval outcome and
//! only reachable from PENDING.

use crate::error::ServiceError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Draft,
    Pending,
    Approved,
    Dispatched,
    Delivered,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Dispatched => "DISPATCHED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ServiceError> {
        match value {
            "DRAFT" => Ok(Self::Draft),
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "DISPATCHED" => Ok(Self::Dispatched),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(ServiceError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }

    /// CANCELLED and REJECTED accept no further transitions; DELIVERED only
    /// accepts payment recording, not status changes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Rejected)
    }

    /// Line items, notes and addresses are editable only before submission
    pub fn allows_content_edit(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Cancellation is permitted pre-dispatch only; once goods are in
    /// transit the order either completes delivery or is handled as a
    /// return outside this system.
    pub fn allows_cancellation(&self) -> bool {
        matches!(self, Self::Draft | Self::Pending | Self::Approved)
    }

    pub fn can_transition_to(&self, target: Self) -> bool {
        match (self, target) {
            (Self::Draft, Self::Pending)
            | (Self::Pending, Self::Approved)
            | (Self::Approved, Self::Dispatched)
            | (Self::Dispatched, Self::Delivered) => true,
            (Self::Pending, Self::Rejected) => true,
            (from, Self::Cancelled) => from.allows_cancellation(),
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks a requested transition, leaving enforcement of the cancel-only
/// path (reason capture) to the caller.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), ServiceError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}

/// Payment state vocabulary stored on orders
pub mod payment_status {
    pub const UNPAID: &str = "UNPAID";
    pub const PARTIAL: &str = "PARTIAL";
    pub const PAID: &str = "PAID";
}

/// Recompute the payment status after a payment is recorded
pub fn derive_payment_status(
    total: rust_decimal::Decimal,
    paid: rust_decimal::Decimal,
) -> &'static str {
    if paid >= total {
        payment_status::PAID
    } else if paid > rust_decimal::Decimal::ZERO {
        payment_status::PARTIAL
    } else {
        payment_status::UNPAID
    }
}

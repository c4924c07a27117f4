use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-order outcome of one reminder delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDetail {
    pub order_id: i32,
    pub order_number: String,
    pub contact_name: String,
    pub outstanding_amount: Decimal,
    pub days_pending: i64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of one reminder scan over all overdue orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRunSummary {
    pub scanned: u64,
    pub sent: u64,
    pub errors: u64,
    pub details: Vec<ReminderDetail>,
}

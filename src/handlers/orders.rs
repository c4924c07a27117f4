//! Order handlers
//!
//! Creation allocates the year-scoped order number; everything after that
//! mutates the order only through validated status transitions, payment
//! recording, or the cancel operation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;

use crate::entities::{orders, payments, prelude::*};
use crate::error::ServiceError;
use crate::models::order::{
    CancelOrderRequest, CreateOrderRequest, OrderListResponse, OrderResponse, OrderSummary,
    PaymentEntry, RecordPaymentRequest, UpdateOrderRequest, UpdateOrderStatusRequest,
};
use crate::models::reminder::ReminderDetail;
use crate::services::order_numbers::next_order_number;
use crate::services::order_status::{
    derive_payment_status, payment_status, validate_transition, OrderStatus,
};
use crate::services::reminders::{outstanding_amount, send_manual_reminder};
use crate::AppState;

pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ServiceError> {
    let correlation_id = uuid::Uuid::new_v4().to_string();
    info!(
        correlation_id = %correlation_id,
        contact_id = payload.contact_id,
        "Order creation request received"
    );

    if payload.total_amount <= Decimal::ZERO {
        return Err(ServiceError::validation("total amount must be positive"));
    }

    let contact = Contacts::find_by_id(payload.contact_id)
        .one(&state.db)
        .await?
        .ok_or(ServiceError::NotFound {
            entity: "contact",
            id: payload.contact_id,
        })?;

    let now = Utc::now();
    let order_number = next_order_number(&state.db, now.date_naive()).await?;

    let order = orders::ActiveModel {
        order_number: Set(order_number),
        contact_id: Set(contact.id),
        status: Set(OrderStatus::Draft.as_str().to_string()),
        total_amount: Set(payload.total_amount),
        due_date: Set(payload.due_date),
        payment_status: Set(payment_status::UNPAID.to_string()),
        notes: Set(payload.notes),
        delivery_address: Set(payload.delivery_address),
        created_at: Set(Some(now.naive_utc())),
        updated_at: Set(Some(now.naive_utc())),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(
        correlation_id = %correlation_id,
        order_id = order.id,
        order_number = %order.order_number,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(order_response(order, Vec::new()))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<String>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<OrderListResponse>, ServiceError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut find = Orders::find();
    if let Some(status) = &query.status {
        let status = OrderStatus::parse(status)?;
        find = find.filter(orders::Column::Status.eq(status.as_str()));
    }

    let paginator = find
        .order_by_desc(orders::Column::Id)
        .paginate(&state.db, per_page);
    let total = paginator.num_items().await?;
    let page_rows = paginator.fetch_page(page - 1).await?;

    Ok(Json(OrderListResponse {
        orders: page_rows.into_iter().map(order_summary).collect(),
        total,
        page,
        per_page,
    }))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>, ServiceError> {
    let order = find_order(&state, id).await?;
    let paid = payments_for(&state, id).await?;
    Ok(Json(order_response(order, paid)))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ServiceError> {
    let order = find_order(&state, id).await?;
    let status = OrderStatus::parse(&order.status)?;

    if !status.allows_content_edit() {
        return Err(ServiceError::validation(
            "order can only be edited while in DRAFT status",
        ));
    }

    if let Some(amount) = payload.total_amount {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::validation("total amount must be positive"));
        }
    }

    let mut active: orders::ActiveModel = order.into();
    if let Some(amount) = payload.total_amount {
        active.total_amount = Set(amount);
    }
    if let Some(due_date) = payload.due_date {
        active.due_date = Set(Some(due_date));
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(address) = payload.delivery_address {
        active.delivery_address = Set(Some(address));
    }
    active.updated_at = Set(Some(Utc::now().naive_utc()));

    let updated = active.update(&state.db).await?;
    Ok(Json(order_response(updated, Vec::new())))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ServiceError> {
    let order = find_order(&state, id).await?;
    let current = OrderStatus::parse(&order.status)?;
    let target = OrderStatus::parse(&payload.status)?;

    if target == OrderStatus::Cancelled {
        return Err(ServiceError::validation(
            "cancellation requires the cancel operation with a reason",
        ));
    }

    validate_transition(current, target)?;

    info!(
        order_id = order.id,
        order_number = %order.order_number,
        from = current.as_str(),
        to = target.as_str(),
        "Order status transition"
    );

    let mut active: orders::ActiveModel = order.into();
    active.status = Set(target.as_str().to_string());
    active.updated_at = Set(Some(Utc::now().naive_utc()));
    let updated = active.update(&state.db).await?;

    let paid = payments_for(&state, id).await?;
    Ok(Json(order_response(updated, paid)))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CancelOrderRequest>,
) -> Result<Json<OrderResponse>, ServiceError> {
    let reason = payload
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ServiceError::validation("cancellation reason is required"))?
        .to_string();

    let order = find_order(&state, id).await?;
    let current = OrderStatus::parse(&order.status)?;
    validate_transition(current, OrderStatus::Cancelled)?;

    info!(
        order_id = order.id,
        order_number = %order.order_number,
        from = current.as_str(),
        "Order cancelled"
    );

    let paid = payments_for(&state, id).await?;
    let now = Utc::now().naive_utc();
    let mut active: orders::ActiveModel = order.into();
    active.status = Set(OrderStatus::Cancelled.as_str().to_string());
    active.cancellation_reason = Set(Some(reason));
    active.cancelled_at = Set(Some(now));
    active.updated_at = Set(Some(now));
    let updated = active.update(&state.db).await?;

    Ok(Json(order_response(updated, paid)))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ServiceError> {
    if payload.amount <= Decimal::ZERO {
        return Err(ServiceError::validation("payment amount must be positive"));
    }

    let order = find_order(&state, id).await?;
    let status = OrderStatus::parse(&order.status)?;
    match status {
        OrderStatus::Draft => {
            return Err(ServiceError::validation(
                "payments cannot be recorded for draft orders",
            ));
        }
        OrderStatus::Cancelled | OrderStatus::Rejected => {
            return Err(ServiceError::validation(
                "payments cannot be recorded for cancelled or rejected orders",
            ));
        }
        _ => {}
    }

    let now = Utc::now().naive_utc();
    payments::ActiveModel {
        order_id: Set(order.id),
        amount: Set(payload.amount),
        method: Set(payload.method),
        reference: Set(payload.reference),
        paid_at: Set(now),
        created_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let paid = payments_for(&state, order.id).await?;
    let paid_total: Decimal = paid.iter().map(|p| p.amount).sum();
    let new_payment_status = derive_payment_status(order.total_amount, paid_total);

    info!(
        order_id = order.id,
        order_number = %order.order_number,
        amount = %payload.amount,
        payment_status = new_payment_status,
        "Payment recorded"
    );

    let mut active: orders::ActiveModel = order.into();
    active.payment_status = Set(new_payment_status.to_string());
    active.updated_at = Set(Some(now));
    let updated = active.update(&state.db).await?;

    Ok((StatusCode::CREATED, Json(order_response(updated, paid))))
}

/// Manual reminder trigger; bypasses the weekly cadence policy
pub async fn send_reminder(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReminderDetail>, ServiceError> {
    let detail = send_manual_reminder(&state.db, &state.notifications, id, Utc::now()).await?;
    Ok(Json(detail))
}

async fn find_order(state: &AppState, id: i32) -> Result<orders::Model, ServiceError> {
    Orders::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServiceError::NotFound {
            entity: "order",
            id,
        })
}

async fn payments_for(state: &AppState, order_id: i32) -> Result<Vec<payments::Model>, ServiceError> {
    Payments::find()
        .filter(payments::Column::OrderId.eq(order_id))
        .all(&state.db)
        .await
        .map_err(Into::into)
}

fn order_summary(order: orders::Model) -> OrderSummary {
    OrderSummary {
        id: order.id,
        order_number: order.order_number,
        contact_id: order.contact_id,
        status: order.status,
        total_amount: order.total_amount,
        due_date: order.due_date,
        payment_status: order.payment_status,
    }
}

fn order_response(order: orders::Model, paid: Vec<payments::Model>) -> OrderResponse {
    let outstanding = outstanding_amount(order.total_amount, &paid);
    OrderResponse {
        id: order.id,
        order_number: order.order_number,
        contact_id: order.contact_id,
        status: order.status,
        total_amount: order.total_amount,
        due_date: order.due_date,
        payment_status: order.payment_status,
        outstanding_amount: outstanding,
        notes: order.notes,
        delivery_address: order.delivery_address,
        cancellation_reason: order.cancellation_reason,
        payments: paid
            .into_iter()
            .map(|p| PaymentEntry {
                id: p.id,
                amount: p.amount,
                method: p.method,
                reference: p.reference,
                paid_at: p.paid_at,
            })
            .collect(),
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

//! Error taxonomy shared by services and handlers
//!
//! Validation and transition failures are client errors and are never
//! retried; provider failures map to 502 so callers can distinguish them
//! from our own faults; database errors are fatal for the enclosing
//! operation and propagate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::order::ErrorResponse;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("external service error: {0}")]
    ExternalService(String),

    #[error("order number sequence exhausted for year {0}")]
    SequenceExhausted(i32),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ExternalService(_) => StatusCode::BAD_GATEWAY,
            Self::SequenceExhausted(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::SequenceExhausted(_) => "SEQUENCE_EXHAUSTED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: Some(self.code().to_string()),
        });
        (status, body).into_response()
    }
}

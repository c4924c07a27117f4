//! Signup OTP handlers
//!
//! Verification is server-enforced: the client submits its code or the
//! provider's single-use access token here, and this backend performs the
//! provider verification call itself before reporting verified.

use axum::{extract::State, Json};
use tracing::info;

use crate::error::ServiceError;
use crate::models::auth::{OtpSendResponse, OtpVerifyResponse, SendOtpRequest, VerifyOtpRequest};
use crate::AppState;

const DEFAULT_OTP_LENGTH: u8 = 6;
const DEFAULT_OTP_EXPIRY_MINUTES: u32 = 10;

pub async fn send_otp(
    State(state): State<AppState>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<Json<OtpSendResponse>, ServiceError> {
    let identifier = payload.identifier.trim();
    if identifier.is_empty() {
        return Err(ServiceError::validation(
            "identifier (phone or email) is required",
        ));
    }

    let result = state
        .otp
        .send_otp(
            identifier,
            payload.length.unwrap_or(DEFAULT_OTP_LENGTH),
            payload.expiry_minutes.unwrap_or(DEFAULT_OTP_EXPIRY_MINUTES),
        )
        .await?;

    info!(success = result.success, "OTP send requested");

    Ok(Json(OtpSendResponse {
        success: result.success,
        error: result.error,
    }))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<OtpVerifyResponse>, ServiceError> {
    let result = match (&payload.token, &payload.identifier, &payload.code) {
        (Some(token), _, _) if !token.trim().is_empty() => {
            state.otp.verify_access_token(token.trim()).await?
        }
        (_, Some(identifier), Some(code))
            if !identifier.trim().is_empty() && !code.trim().is_empty() =>
        {
            state.otp.verify_otp(identifier.trim(), code.trim()).await?
        }
        _ => {
            return Err(ServiceError::validation(
                "either token or identifier and code are required",
            ));
        }
    };

    info!(verified = result.verified, "OTP verification performed");

    Ok(Json(OtpVerifyResponse {
        success: result.success,
        verified: result.verified,
        data: result.data,
        error: result.error,
    }))
}

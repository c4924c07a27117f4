//! OTP provider adapter
//!
//! Forwards send/verify requests to the external OTP vendor. Verification
//! happens server-side only: the client hands its code or single-use access
//! token to this backend, which performs the one permitted provider
//! verification call. A client-side "widget succeeded" claim is never
//! trusted on its own.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;

use crate::error::ServiceError;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct OtpSendResult {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OtpVerifyResult {
    pub success: bool,
    pub verified: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderVerifyResponse {
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct OtpService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OtpService {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url,
            api_key,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            env::var("OTP_API_BASE_URL").unwrap_or_default(),
            env::var("OTP_API_KEY").unwrap_or_default(),
        )
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    pub async fn send_otp(
        &self,
        identifier: &str,
        length: u8,
        expiry_minutes: u32,
    ) -> Result<OtpSendResult, ServiceError> {
        let body = json!({
            "identifier": identifier,
            "otp_length": length,
            "expiry": expiry_minutes,
        });
        let response = self.post("otp/send", &body).await?;
        Ok(OtpSendResult {
            success: response.error.is_none(),
            error: response.error,
        })
    }

    pub async fn verify_otp(
        &self,
        identifier: &str,
        code: &str,
    ) -> Result<OtpVerifyResult, ServiceError> {
        let body = json!({
            "identifier": identifier,
            "otp": code,
        });
        let response = self.post("otp/verify", &body).await?;
        Ok(response.into_verify_result())
    }

    /// Verify the provider's single-use access token. The token can only be
    /// checked once; a second attempt fails at the provider with an
    /// already-verified error, which is why this call happens here and
    /// nowhere else.
    pub async fn verify_access_token(&self, token: &str) -> Result<OtpVerifyResult, ServiceError> {
        let body = json!({ "access_token": token });
        let response = self.post("token/verify", &body).await?;
        Ok(response.into_verify_result())
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ParsedProviderResponse, ServiceError> {
        if !self.is_configured() {
            return Err(ServiceError::ExternalService(
                "OTP provider not configured".to_string(),
            ));
        }

        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("accept", "application/json")
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalService(format!("OTP provider request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::ExternalService(format!("OTP provider request failed: {e}")))?;

        if !status.is_success() {
            // Provider rejections (wrong code, expired token) come back as
            // 4xx with a message body; report them to the caller instead of
            // failing the request outright.
            let parsed: ProviderVerifyResponse = serde_json::from_str(&text).unwrap_or_default();
            return Ok(ParsedProviderResponse {
                verified: false,
                data: parsed.data,
                error: Some(
                    parsed
                        .message
                        .unwrap_or_else(|| format!("OTP provider error {status}")),
                ),
            });
        }

        let parsed: ProviderVerifyResponse = serde_json::from_str(&text).unwrap_or_default();
        Ok(ParsedProviderResponse {
            verified: parsed.verified,
            data: parsed.data,
            error: None,
        })
    }
}

struct ParsedProviderResponse {
    verified: bool,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

impl ParsedProviderResponse {
    fn into_verify_result(self) -> OtpVerifyResult {
        OtpVerifyResult {
            success: self.error.is_none(),
            verified: self.verified,
            data: self.data,
            error: self.error,
        }
    }
}

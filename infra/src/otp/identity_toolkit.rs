//! Identity toolkit REST provider
//!
//! Talks to the phone-auth endpoints of the identity toolkit v1 API, or to a
//! local auth emulator serving the same paths:
//!
//! - `accounts:sendVerificationCode` issues a code and returns `sessionInfo`
//! - `accounts:signInWithPhoneNumber` confirms a code against `sessionInfo`
//! - `accounts:delete` removes the identity created by the confirmation
//!
//! Error bodies look like `{"error": {"message": "INVALID_CODE : detail"}}`;
//! the message is passed on as the provider error code for translation.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use pv_core::domain::value_objects::{ConfirmationHandle, VerifiedIdentity};
use pv_core::services::verification::{OtpProvider, ProviderError};
use pv_shared::phone::mask_phone;

use crate::config::OtpProviderConfig;
use crate::InfrastructureError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendVerificationCodeRequest<'a> {
    phone_number: &'a str,
    recaptcha_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendVerificationCodeResponse {
    session_info: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithPhoneNumberRequest<'a> {
    session_info: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithPhoneNumberResponse {
    id_token: String,
    local_id: String,
    #[serde(default)]
    phone_number: String,
    #[serde(default)]
    is_new_user: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAccountRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// OTP provider backed by the identity toolkit REST API
pub struct IdentityToolkitProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl IdentityToolkitProvider {
    /// Create a provider; the API key is required
    pub fn new(config: &OtpProviderConfig) -> Result<Self, InfrastructureError> {
        if config.api_key.trim().is_empty() {
            return Err(InfrastructureError::Config("OTP_API_KEY not set".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        tracing::info!(
            base_url = %config.base_url,
            "Identity toolkit OTP provider initialized"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(&OtpProviderConfig::from_env())
    }

    fn endpoint(&self, method: &str) -> String {
        endpoint_url(&self.base_url, method)
    }

    async fn post<B, R>(&self, method: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(method))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return response.json::<R>().await.map_err(|e| {
                tracing::error!(method = method, error = %e, "Unexpected identity toolkit response");
                ProviderError::new("INVALID_RESPONSE", e.to_string())
            });
        }

        let body = response.text().await.unwrap_or_default();
        let error = parse_error_body(status.as_u16(), &body);
        tracing::debug!(
            method = method,
            status = status.as_u16(),
            provider_code = %error.code,
            "Identity toolkit request rejected"
        );
        Err(error)
    }
}

/// Full URL of an `accounts:*` method
pub(crate) fn endpoint_url(base_url: &str, method: &str) -> String {
    format!("{}/accounts:{}", base_url.trim_end_matches('/'), method)
}

/// Provider error from a non-success response body
pub(crate) fn parse_error_body(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ProviderError::new(envelope.error.message, format!("HTTP {}", status)),
        Err(_) => {
            let detail: String = body.chars().take(200).collect();
            ProviderError::new(format!("HTTP_{}", status), detail)
        }
    }
}

fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::new("TIMEOUT", error.to_string())
    } else {
        ProviderError::network(error.to_string())
    }
}

#[async_trait]
impl OtpProvider for IdentityToolkitProvider {
    async fn send_verification_code(
        &self,
        phone_e164: &str,
        challenge_token: &str,
    ) -> Result<ConfirmationHandle, ProviderError> {
        tracing::debug!(
            phone = %mask_phone(phone_e164),
            "Requesting verification code from identity toolkit"
        );
        let request = SendVerificationCodeRequest {
            phone_number: phone_e164,
            recaptcha_token: challenge_token,
        };
        let response: SendVerificationCodeResponse =
            self.post("sendVerificationCode", &request).await?;
        Ok(ConfirmationHandle::new(response.session_info))
    }

    async fn confirm_code(
        &self,
        handle: &ConfirmationHandle,
        code: &str,
    ) -> Result<VerifiedIdentity, ProviderError> {
        let request = SignInWithPhoneNumberRequest {
            session_info: handle.as_str(),
            code,
        };
        let response: SignInWithPhoneNumberResponse =
            self.post("signInWithPhoneNumber", &request).await?;
        Ok(VerifiedIdentity {
            uid: response.local_id,
            phone_number: response.phone_number,
            id_token: response.id_token,
            is_new_user: response.is_new_user,
        })
    }

    async fn delete_identity(&self, identity: &VerifiedIdentity) -> Result<(), ProviderError> {
        let request = DeleteAccountRequest {
            id_token: &identity.id_token,
        };
        let _: serde_json::Value = self.post("delete", &request).await?;
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "IdentityToolkit"
    }
}

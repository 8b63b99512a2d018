//! Thin wrapper over the external phone-identity service

use std::sync::Arc;

use pv_shared::phone::mask_phone;

use crate::domain::value_objects::{ConfirmationHandle, VerifiedIdentity};
use crate::errors::VerificationErrorKind;

use super::error_translator::ErrorTranslator;
use super::traits::OtpProvider;

/// Issues and confirms codes, translating every provider failure
pub struct OtpSessionClient {
    provider: Arc<dyn OtpProvider>,
    translator: ErrorTranslator,
}

impl OtpSessionClient {
    pub fn new(provider: Arc<dyn OtpProvider>) -> Self {
        Self {
            provider,
            translator: ErrorTranslator,
        }
    }

    /// Ask the provider to deliver a code to `phone_e164`
    pub async fn initiate(
        &self,
        phone_e164: &str,
        challenge_token: &str,
    ) -> Result<ConfirmationHandle, VerificationErrorKind> {
        match self
            .provider
            .send_verification_code(phone_e164, challenge_token)
            .await
        {
            Ok(handle) => {
                tracing::info!(
                    phone = %mask_phone(phone_e164),
                    provider = self.provider.provider_name(),
                    event = "otp_code_sent",
                    "Verification code sent"
                );
                Ok(handle)
            }
            Err(error) => {
                let kind = self.translator.translate(&error);
                tracing::warn!(
                    phone = %mask_phone(phone_e164),
                    provider = self.provider.provider_name(),
                    provider_code = %error.code,
                    kind = kind.code(),
                    event = "otp_send_failed",
                    "Provider rejected verification code request"
                );
                Err(kind)
            }
        }
    }

    /// Confirm `code` against the challenge behind `handle`
    pub async fn confirm(
        &self,
        handle: &ConfirmationHandle,
        code: &str,
    ) -> Result<VerifiedIdentity, VerificationErrorKind> {
        match self.provider.confirm_code(handle, code).await {
            Ok(identity) => {
                tracing::info!(
                    phone = %mask_phone(&identity.phone_number),
                    provider = self.provider.provider_name(),
                    event = "otp_verified_success",
                    "Verification code confirmed"
                );
                Ok(identity)
            }
            Err(error) => {
                let kind = self.translator.translate(&error);
                tracing::warn!(
                    provider = self.provider.provider_name(),
                    provider_code = %error.code,
                    kind = kind.code(),
                    event = "otp_verification_failed",
                    "Provider rejected verification code"
                );
                Err(kind)
            }
        }
    }

    /// Delete the provisional identity, best effort
    ///
    /// Failure is logged and swallowed: the leftover identity has no profile
    /// data, and a confirmed verification must not be retracted by cleanup.
    pub async fn discard_provisional_identity(&self, identity: &VerifiedIdentity) {
        match self.provider.delete_identity(identity).await {
            Ok(()) => tracing::debug!(
                uid = %identity.uid,
                event = "provisional_identity_deleted",
                "Deleted provisional identity"
            ),
            Err(error) => tracing::warn!(
                uid = %identity.uid,
                provider_code = %error.code,
                error = %error.message,
                event = "provisional_identity_cleanup_failed",
                "Failed to delete provisional identity"
            ),
        }
    }
}

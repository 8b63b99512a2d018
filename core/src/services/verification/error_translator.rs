//! Maps raw provider error codes onto the closed error taxonomy

use crate::errors::VerificationErrorKind;

use super::types::ProviderError;

/// Translates provider errors at the boundary so no raw code leaks past it
///
/// Both the client SDK form (`auth/invalid-verification-code`) and the REST
/// form (`INVALID_CODE`, `TOO_MANY_ATTEMPTS_TRY_LATER : detail`) are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTranslator;

impl ErrorTranslator {
    pub fn translate(&self, error: &ProviderError) -> VerificationErrorKind {
        translate_provider_code(&error.code)
    }
}

/// Canonical form: no `auth/` prefix, no detail suffix, upper snake case
fn canonical_code(raw: &str) -> String {
    let code = raw.split(':').next().unwrap_or(raw).trim();
    let code = code.strip_prefix("auth/").unwrap_or(code);
    code.replace('-', "_").to_ascii_uppercase()
}

/// Translate a single provider error code
pub fn translate_provider_code(raw: &str) -> VerificationErrorKind {
    match canonical_code(raw).as_str() {
        "INVALID_PHONE_NUMBER" | "MISSING_PHONE_NUMBER" => VerificationErrorKind::PhoneInvalid,
        "TOO_MANY_REQUESTS" | "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            VerificationErrorKind::TooManyRequests
        }
        "INVALID_VERIFICATION_CODE" | "INVALID_CODE" => VerificationErrorKind::InvalidCode,
        "CODE_EXPIRED" | "SESSION_EXPIRED" | "INVALID_VERIFICATION_ID" | "INVALID_SESSION_INFO" => {
            VerificationErrorKind::CodeExpired
        }
        "MISSING_VERIFICATION_CODE" | "MISSING_CODE" => VerificationErrorKind::MissingCode,
        "QUOTA_EXCEEDED" => VerificationErrorKind::QuotaExceeded,
        "CAPTCHA_CHECK_FAILED"
        | "INVALID_APP_CREDENTIAL"
        | "MISSING_APP_CREDENTIAL"
        | "MISSING_RECAPTCHA_TOKEN"
        | "INVALID_RECAPTCHA_TOKEN" => VerificationErrorKind::CaptchaFailed,
        "NETWORK_REQUEST_FAILED" | "TIMEOUT" => VerificationErrorKind::NetworkError,
        "INVALID_API_KEY" | "API_KEY_INVALID" | "APP_NOT_AUTHORIZED" | "UNAUTHORIZED_DOMAIN"
        | "INVALID_APP_ID" => VerificationErrorKind::ProviderMisconfigured,
        "OPERATION_NOT_ALLOWED" | "ADMIN_RESTRICTED_OPERATION" | "ADMIN_ONLY_OPERATION" => {
            VerificationErrorKind::ProviderDisabled
        }
        _ => VerificationErrorKind::Unknown,
    }
}

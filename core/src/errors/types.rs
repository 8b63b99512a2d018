//! User-facing verification error taxonomy with bilingual messages
//!
//! The set is closed: raw provider errors are translated into one of these
//! kinds before they leave the OTP session client, and each kind carries a
//! stable message key for the UI to look up.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of verification failures surfaced to callers
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationErrorKind {
    #[error("Invalid phone number | 无效的手机号码")]
    PhoneInvalid,

    #[error("Too many requests. Please try again later | 请求过于频繁，请稍后重试")]
    TooManyRequests,

    #[error("Invalid verification code | 验证码错误")]
    InvalidCode,

    #[error("Verification code expired. Please request a new code | 验证码已过期，请重新获取")]
    CodeExpired,

    #[error("Please enter the verification code | 请输入验证码")]
    MissingCode,

    #[error("SMS quota exceeded. Please try again later | 短信配额已用尽，请稍后重试")]
    QuotaExceeded,

    #[error("Security check failed. Please try again | 安全验证失败，请重试")]
    CaptchaFailed,

    #[error("Network error. Check your connection | 网络错误，请检查网络连接")]
    NetworkError,

    #[error("Phone verification is misconfigured | 手机验证配置错误")]
    ProviderMisconfigured,

    #[error("Phone verification is currently disabled | 手机验证功能暂时关闭")]
    ProviderDisabled,

    #[error("Verification failed. Please try again | 验证失败，请重试")]
    Unknown,
}

impl VerificationErrorKind {
    /// Every kind, in declaration order
    pub const ALL: [VerificationErrorKind; 11] = [
        VerificationErrorKind::PhoneInvalid,
        VerificationErrorKind::TooManyRequests,
        VerificationErrorKind::InvalidCode,
        VerificationErrorKind::CodeExpired,
        VerificationErrorKind::MissingCode,
        VerificationErrorKind::QuotaExceeded,
        VerificationErrorKind::CaptchaFailed,
        VerificationErrorKind::NetworkError,
        VerificationErrorKind::ProviderMisconfigured,
        VerificationErrorKind::ProviderDisabled,
        VerificationErrorKind::Unknown,
    ];

    /// Stable key the UI uses to look up its own localized copy
    pub fn message_key(&self) -> &'static str {
        match self {
            VerificationErrorKind::PhoneInvalid => "phone_verification.error.phone_invalid",
            VerificationErrorKind::TooManyRequests => "phone_verification.error.too_many_requests",
            VerificationErrorKind::InvalidCode => "phone_verification.error.invalid_code",
            VerificationErrorKind::CodeExpired => "phone_verification.error.code_expired",
            VerificationErrorKind::MissingCode => "phone_verification.error.missing_code",
            VerificationErrorKind::QuotaExceeded => "phone_verification.error.quota_exceeded",
            VerificationErrorKind::CaptchaFailed => "phone_verification.error.captcha_failed",
            VerificationErrorKind::NetworkError => "phone_verification.error.network_error",
            VerificationErrorKind::ProviderMisconfigured => {
                "phone_verification.error.provider_misconfigured"
            }
            VerificationErrorKind::ProviderDisabled => "phone_verification.error.provider_disabled",
            VerificationErrorKind::Unknown => "phone_verification.error.unknown",
        }
    }

    /// Error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            VerificationErrorKind::PhoneInvalid => "PHONE_INVALID",
            VerificationErrorKind::TooManyRequests => "TOO_MANY_REQUESTS",
            VerificationErrorKind::InvalidCode => "INVALID_CODE",
            VerificationErrorKind::CodeExpired => "CODE_EXPIRED",
            VerificationErrorKind::MissingCode => "MISSING_CODE",
            VerificationErrorKind::QuotaExceeded => "QUOTA_EXCEEDED",
            VerificationErrorKind::CaptchaFailed => "CAPTCHA_FAILED",
            VerificationErrorKind::NetworkError => "NETWORK_ERROR",
            VerificationErrorKind::ProviderMisconfigured => "PROVIDER_MISCONFIGURED",
            VerificationErrorKind::ProviderDisabled => "PROVIDER_DISABLED",
            VerificationErrorKind::Unknown => "UNKNOWN",
        }
    }

    /// Whether retrying the same action can succeed
    ///
    /// Misconfigured or disabled providers fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            VerificationErrorKind::ProviderMisconfigured | VerificationErrorKind::ProviderDisabled
        )
    }

    /// English half of the bilingual message
    pub fn message_en(&self) -> String {
        extract_english_message(&self.to_string()).to_string()
    }

    /// Chinese half of the bilingual message
    pub fn message_zh(&self) -> String {
        extract_chinese_message(&self.to_string()).to_string()
    }
}

/// Helper function to extract English message from bilingual error
pub fn extract_english_message(message: &str) -> &str {
    message.split(" | ").next().unwrap_or(message)
}

/// Helper function to extract Chinese message from bilingual error
pub fn extract_chinese_message(message: &str) -> &str {
    message.split(" | ").nth(1).unwrap_or(message)
}

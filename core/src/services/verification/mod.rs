//! Phone-ownership verification via a one-time SMS code
//!
//! This module provides the complete client-side flow:
//! - Phone normalization to E.164
//! - Challenge widget ownership (create once, reuse, dispose once)
//! - Code issue and confirmation through an external provider
//! - Progressive resend cooldowns and attempt ceilings
//! - Code expiry detection by cooperative polling
//! - The controller state machine that ties them together

mod attempt_limiter;
mod captcha;
mod controller;
mod cooldown;
mod error_translator;
mod expiry_timer;
mod otp_client;
mod phone_normalizer;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use attempt_limiter::AttemptLimiter;
pub use captcha::{CaptchaChallengeProvider, ChallengeHandle};
pub use controller::VerificationController;
pub use cooldown::{CooldownPolicy, DEFAULT_COOLDOWN_TABLE};
pub use error_translator::{translate_provider_code, ErrorTranslator};
pub use expiry_timer::{SessionExpiryTimer, MAX_CODE_VALIDITY_SECONDS};
pub use otp_client::OtpSessionClient;
pub use phone_normalizer::PhoneNormalizer;
pub use traits::{AnchorHost, ChallengeWidget, Clock, OtpProvider, SystemClock};
pub use types::{
    ChallengeCallbacks, OperationOutcome, ProviderError, VerificationSnapshot, WidgetId,
};

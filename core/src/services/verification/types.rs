//! Types exchanged with the verification controller and its collaborators

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::entities::VerificationStep;
use crate::errors::VerificationErrorKind;

/// Raw error reported by an OTP provider, before translation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ProviderError {
    /// Provider error code, e.g. `auth/invalid-verification-code` or `INVALID_CODE`
    pub code: String,
    /// Provider message, kept for logs only
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Transport failure before the provider answered
    pub fn network(message: impl Into<String>) -> Self {
        Self::new("auth/network-request-failed", message)
    }
}

/// Identifier of a rendered challenge widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(pub u64);

type SolvedCallback = Arc<dyn Fn(&str) + Send + Sync>;
type ExpiredCallback = Arc<dyn Fn() + Send + Sync>;

/// Callbacks wired into the challenge widget when it is rendered
#[derive(Clone)]
pub struct ChallengeCallbacks {
    on_solved: SolvedCallback,
    on_expired: ExpiredCallback,
}

impl ChallengeCallbacks {
    pub fn new(
        on_solved: impl Fn(&str) + Send + Sync + 'static,
        on_expired: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_solved: Arc::new(on_solved),
            on_expired: Arc::new(on_expired),
        }
    }

    /// Callbacks that do nothing
    pub fn noop() -> Self {
        Self::new(|_| {}, || {})
    }

    /// The widget produced a token
    pub fn solved(&self, token: &str) {
        (self.on_solved)(token)
    }

    /// The last token expired before it was used
    pub fn expired(&self) {
        (self.on_expired)()
    }
}

impl fmt::Debug for ChallengeCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChallengeCallbacks")
    }
}

/// Result of a public controller operation
///
/// Errors are returned inline so callers never read a shared "current error"
/// that a later operation already overwrote. `success == false` with no
/// error means the call was ignored (operation in flight, stale result, or
/// no transition from the current step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<VerificationErrorKind>,
}

impl OperationOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(kind: VerificationErrorKind) -> Self {
        Self {
            success: false,
            error: Some(kind),
        }
    }

    pub fn ignored() -> Self {
        Self {
            success: false,
            error: None,
        }
    }
}

/// Read-only view of the controller for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationSnapshot {
    pub step: VerificationStep,
    pub phone_number: Option<String>,
    pub last_error: Option<VerificationErrorKind>,
    pub resend_cooldown_seconds: u64,
    pub session_expired: bool,
    pub resend_attempts: u32,
    pub verification_attempts: u32,
    pub max_resends_reached: bool,
    pub max_verifications_reached: bool,
    pub remaining_verification_attempts: u32,
    /// Drives the last-attempt warning on the code entry step
    pub is_last_verification_attempt: bool,
    /// Seconds until the current code expires, while one is outstanding
    pub code_expires_in_seconds: Option<u64>,
}

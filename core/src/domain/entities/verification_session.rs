//! Verification session entity for phone-ownership verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{AttemptCounter, ConfirmationHandle, VerifiedIdentity};
use crate::errors::VerificationErrorKind;

/// Steps of the verification flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStep {
    Idle,
    Sending,
    CodeSent,
    Verifying,
    Verified,
    Error,
}

impl VerificationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStep::Idle => "idle",
            VerificationStep::Sending => "sending",
            VerificationStep::CodeSent => "code_sent",
            VerificationStep::Verifying => "verifying",
            VerificationStep::Verified => "verified",
            VerificationStep::Error => "error",
        }
    }

    /// A provider call is outstanding
    pub fn is_in_flight(&self) -> bool {
        matches!(self, VerificationStep::Sending | VerificationStep::Verifying)
    }
}

impl std::fmt::Display for VerificationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one verification attempt, from phone entry to verified
///
/// A session is never reused: reset replaces it with a fresh one. The
/// transition methods keep `pending_confirmation_handle` present exactly
/// while the step is `CodeSent` or `Verifying`.
#[derive(Debug, Clone)]
pub struct VerificationSession {
    id: Uuid,
    step: VerificationStep,
    phone_number: Option<String>,
    pending_confirmation_handle: Option<ConfirmationHandle>,
    code_sent_at: Option<DateTime<Utc>>,
    resend_cooldown_seconds: u64,
    resend_attempts: AttemptCounter,
    verification_attempts: AttemptCounter,
    session_expired: bool,
    last_error: Option<VerificationErrorKind>,
    verified_identity: Option<VerifiedIdentity>,
}

impl VerificationSession {
    /// Creates an idle session with the given ceilings
    pub fn new(max_resends: u32, max_verifications: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            step: VerificationStep::Idle,
            phone_number: None,
            pending_confirmation_handle: None,
            code_sent_at: None,
            resend_cooldown_seconds: 0,
            resend_attempts: AttemptCounter::new(max_resends),
            verification_attempts: AttemptCounter::new(max_verifications),
            session_expired: false,
            last_error: None,
            verified_identity: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> VerificationStep {
        self.step
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn pending_confirmation_handle(&self) -> Option<&ConfirmationHandle> {
        self.pending_confirmation_handle.as_ref()
    }

    pub fn code_sent_at(&self) -> Option<DateTime<Utc>> {
        self.code_sent_at
    }

    pub fn code_sent_at_epoch_ms(&self) -> Option<i64> {
        self.code_sent_at.map(|t| t.timestamp_millis())
    }

    pub fn resend_attempts(&self) -> &AttemptCounter {
        &self.resend_attempts
    }

    pub fn verification_attempts(&self) -> &AttemptCounter {
        &self.verification_attempts
    }

    pub fn session_expired(&self) -> bool {
        self.session_expired
    }

    pub fn last_error(&self) -> Option<VerificationErrorKind> {
        self.last_error
    }

    pub fn verified_identity(&self) -> Option<&VerifiedIdentity> {
        self.verified_identity.as_ref()
    }

    /// Whether a code was successfully issued at least once
    ///
    /// Any send after that counts as a resend.
    pub fn has_issued_code(&self) -> bool {
        self.code_sent_at.is_some()
    }

    /// Cooldown length applied to the current code
    pub fn resend_cooldown_total(&self) -> u64 {
        self.resend_cooldown_seconds
    }

    /// Seconds left before a resend is allowed
    pub fn resend_cooldown_remaining(&self, now: DateTime<Utc>) -> u64 {
        match self.code_sent_at {
            Some(sent_at) => {
                let elapsed = (now - sent_at).num_seconds().max(0) as u64;
                self.resend_cooldown_seconds.saturating_sub(elapsed)
            }
            None => 0,
        }
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn record_error(&mut self, kind: VerificationErrorKind) {
        self.last_error = Some(kind);
    }

    /// Enter `Sending`
    ///
    /// The phone number may still change while no code has been issued.
    /// A resend consumes one resend attempt.
    pub fn begin_sending(&mut self, phone_e164: &str, is_resend: bool) {
        self.step = VerificationStep::Sending;
        self.last_error = None;
        self.pending_confirmation_handle = None;
        if !self.has_issued_code() {
            self.phone_number = Some(phone_e164.to_string());
        }
        if is_resend {
            self.resend_attempts.record();
        }
    }

    /// Enter `CodeSent` with a freshly issued code
    pub fn code_issued(
        &mut self,
        handle: ConfirmationHandle,
        now: DateTime<Utc>,
        cooldown_seconds: u64,
    ) {
        self.step = VerificationStep::CodeSent;
        self.pending_confirmation_handle = Some(handle);
        self.code_sent_at = Some(now);
        self.resend_cooldown_seconds = cooldown_seconds;
        self.verification_attempts.reset();
        self.session_expired = false;
    }

    /// Enter `Error` after a failed send
    pub fn send_failed(&mut self, kind: VerificationErrorKind) {
        self.step = VerificationStep::Error;
        self.pending_confirmation_handle = None;
        self.last_error = Some(kind);
    }

    /// Enter `Verifying`, returning the handle to confirm against
    ///
    /// Returns `None` and leaves the session untouched unless a code is
    /// outstanding.
    pub fn begin_verifying(&mut self) -> Option<ConfirmationHandle> {
        if self.step != VerificationStep::CodeSent {
            return None;
        }
        let handle = self.pending_confirmation_handle.clone()?;
        self.step = VerificationStep::Verifying;
        self.last_error = None;
        Some(handle)
    }

    /// Back to `CodeSent` after the provider rejected the code
    pub fn wrong_code(&mut self) {
        self.step = VerificationStep::CodeSent;
        self.verification_attempts.record();
        self.last_error = Some(VerificationErrorKind::InvalidCode);
    }

    /// Back to `CodeSent` after a confirm failure that is not a wrong code
    pub fn confirm_failed(&mut self, kind: VerificationErrorKind) {
        self.step = VerificationStep::CodeSent;
        self.last_error = Some(kind);
        if kind == VerificationErrorKind::CodeExpired {
            self.session_expired = true;
        }
    }

    /// Enter the terminal `Verified` step
    pub fn mark_verified(&mut self, identity: VerifiedIdentity) {
        self.step = VerificationStep::Verified;
        self.pending_confirmation_handle = None;
        self.last_error = None;
        self.verified_identity = Some(identity);
    }

    /// Latch expiry of the current code; the step is left alone
    pub fn mark_expired(&mut self) {
        self.session_expired = true;
        self.last_error = Some(VerificationErrorKind::CodeExpired);
    }
}

//! Gates for resend and wrong-code ceilings

use crate::domain::entities::VerificationSession;
use crate::errors::VerificationErrorKind;
use pv_shared::phone::mask_phone;

/// Checks the session's two attempt counters before any provider call
///
/// Reaching either ceiling is terminal for the session. Once wrong codes are
/// exhausted a resend is refused as well, otherwise the fresh code would
/// clear the wrong-code count and reopen guessing.
#[derive(Debug, Clone, Copy)]
pub struct AttemptLimiter {
    max_resends: u32,
    max_verifications: u32,
}

impl AttemptLimiter {
    pub fn new(max_resends: u32, max_verifications: u32) -> Self {
        Self {
            max_resends,
            max_verifications,
        }
    }

    /// A fresh session carrying these ceilings
    pub fn new_session(&self) -> VerificationSession {
        VerificationSession::new(self.max_resends, self.max_verifications)
    }

    /// Allow a resend only while both counters have room
    pub fn check_resend(&self, session: &VerificationSession) -> Result<(), VerificationErrorKind> {
        if session.resend_attempts().is_exhausted() {
            tracing::warn!(
                phone = %mask_phone(session.phone_number().unwrap_or_default()),
                resend_attempts = session.resend_attempts().count(),
                event = "max_resends_reached",
                "Resend refused, maximum resends reached"
            );
            return Err(VerificationErrorKind::TooManyRequests);
        }
        if session.verification_attempts().is_exhausted() {
            tracing::warn!(
                phone = %mask_phone(session.phone_number().unwrap_or_default()),
                event = "resend_after_max_verifications",
                "Resend refused, verification attempts exhausted"
            );
            return Err(VerificationErrorKind::TooManyRequests);
        }
        Ok(())
    }

    /// Allow a confirmation only while wrong codes remain
    pub fn check_verify(&self, session: &VerificationSession) -> Result<(), VerificationErrorKind> {
        if session.verification_attempts().is_exhausted() {
            tracing::warn!(
                phone = %mask_phone(session.phone_number().unwrap_or_default()),
                verification_attempts = session.verification_attempts().count(),
                event = "max_verifications_reached",
                "Verification refused, maximum attempts reached"
            );
            return Err(VerificationErrorKind::TooManyRequests);
        }
        Ok(())
    }
}

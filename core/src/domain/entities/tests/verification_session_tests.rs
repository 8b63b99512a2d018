//! Unit tests for the verification session entity

use chrono::{Duration, Utc};

use crate::domain::entities::verification_session::{VerificationSession, VerificationStep};
use crate::domain::value_objects::{ConfirmationHandle, VerifiedIdentity};
use crate::errors::VerificationErrorKind;

const PHONE: &str = "+14155552671";

fn issued_session() -> VerificationSession {
    let mut session = VerificationSession::new(3, 5);
    session.begin_sending(PHONE, false);
    session.code_issued(ConfirmationHandle::new("handle-1"), Utc::now(), 60);
    session
}

fn identity() -> VerifiedIdentity {
    VerifiedIdentity {
        uid: "uid-1".to_string(),
        phone_number: PHONE.to_string(),
        id_token: "id-token".to_string(),
        is_new_user: true,
    }
}

#[test]
fn test_new_session_is_idle() {
    let session = VerificationSession::new(3, 5);
    assert_eq!(session.step(), VerificationStep::Idle);
    assert!(session.phone_number().is_none());
    assert!(session.pending_confirmation_handle().is_none());
    assert_eq!(session.resend_attempts().count(), 0);
    assert_eq!(session.verification_attempts().ceiling(), 5);
    assert!(!session.has_issued_code());
}

#[test]
fn test_handle_present_only_while_code_outstanding() {
    let mut session = VerificationSession::new(3, 5);
    session.begin_sending(PHONE, false);
    assert_eq!(session.step(), VerificationStep::Sending);
    assert!(session.pending_confirmation_handle().is_none());

    session.code_issued(ConfirmationHandle::new("handle-1"), Utc::now(), 60);
    assert!(session.pending_confirmation_handle().is_some());

    let handle = session.begin_verifying().unwrap();
    assert_eq!(handle.as_str(), "handle-1");
    assert_eq!(session.step(), VerificationStep::Verifying);
    assert!(session.pending_confirmation_handle().is_some());

    session.mark_verified(identity());
    assert_eq!(session.step(), VerificationStep::Verified);
    assert!(session.pending_confirmation_handle().is_none());
}

#[test]
fn test_failed_send_clears_handle() {
    let mut session = issued_session();
    session.begin_sending(PHONE, true);
    session.send_failed(VerificationErrorKind::NetworkError);

    assert_eq!(session.step(), VerificationStep::Error);
    assert!(session.pending_confirmation_handle().is_none());
    assert_eq!(session.last_error(), Some(VerificationErrorKind::NetworkError));
}

#[test]
fn test_resend_counts_but_first_send_does_not() {
    let mut session = VerificationSession::new(3, 5);
    session.begin_sending(PHONE, false);
    assert_eq!(session.resend_attempts().count(), 0);

    session.code_issued(ConfirmationHandle::new("handle-1"), Utc::now(), 60);
    session.begin_sending(PHONE, true);
    assert_eq!(session.resend_attempts().count(), 1);
}

#[test]
fn test_new_code_resets_verification_attempts_and_expiry() {
    let mut session = issued_session();
    session.begin_verifying();
    session.wrong_code();
    session.begin_verifying();
    session.wrong_code();
    session.mark_expired();
    assert_eq!(session.verification_attempts().count(), 2);
    assert!(session.session_expired());

    session.begin_sending(PHONE, true);
    session.code_issued(ConfirmationHandle::new("handle-2"), Utc::now(), 60);

    assert_eq!(session.verification_attempts().count(), 0);
    assert_eq!(session.resend_attempts().count(), 1);
    assert!(!session.session_expired());
}

#[test]
fn test_phone_number_is_fixed_once_a_code_is_issued() {
    let mut session = VerificationSession::new(3, 5);
    session.begin_sending("+14155550000", false);
    session.send_failed(VerificationErrorKind::NetworkError);

    // Still no code, so a corrected number replaces the first one
    session.begin_sending(PHONE, false);
    assert_eq!(session.phone_number(), Some(PHONE));

    session.code_issued(ConfirmationHandle::new("handle-1"), Utc::now(), 60);
    session.begin_sending("+14155559999", true);
    assert_eq!(session.phone_number(), Some(PHONE));
}

#[test]
fn test_confirm_failures() {
    let mut session = issued_session();
    session.begin_verifying();
    session.confirm_failed(VerificationErrorKind::NetworkError);
    assert_eq!(session.step(), VerificationStep::CodeSent);
    assert_eq!(session.verification_attempts().count(), 0);
    assert!(!session.session_expired());

    session.begin_verifying();
    session.confirm_failed(VerificationErrorKind::CodeExpired);
    assert!(session.session_expired());
    assert_eq!(session.last_error(), Some(VerificationErrorKind::CodeExpired));
}

#[test]
fn test_begin_verifying_requires_code_sent() {
    let mut session = VerificationSession::new(3, 5);
    assert!(session.begin_verifying().is_none());
    assert_eq!(session.step(), VerificationStep::Idle);

    let mut session = issued_session();
    session.begin_verifying();
    // Already verifying, no second transition
    assert!(session.begin_verifying().is_none());
}

#[test]
fn test_resend_cooldown_remaining() {
    let now = Utc::now();
    let mut session = VerificationSession::new(3, 5);
    assert_eq!(session.resend_cooldown_remaining(now), 0);

    session.begin_sending(PHONE, false);
    session.code_issued(ConfirmationHandle::new("handle-1"), now, 60);
    assert_eq!(session.resend_cooldown_remaining(now), 60);
    assert_eq!(session.resend_cooldown_remaining(now + Duration::seconds(45)), 15);
    assert_eq!(session.resend_cooldown_remaining(now + Duration::seconds(90)), 0);
    assert_eq!(session.code_sent_at_epoch_ms(), Some(now.timestamp_millis()));
}

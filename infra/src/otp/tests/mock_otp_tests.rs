//! Unit tests for the mock OTP provider

use pv_core::errors::VerificationErrorKind;
use pv_core::services::verification::{translate_provider_code, OtpProvider};

use crate::otp::MockOtpProvider;

const PHONE: &str = "+14155552671";

#[tokio::test]
async fn test_fixed_code_round_trip() {
    let provider = MockOtpProvider::new(Some("123456".to_string()));

    let handle = provider.send_verification_code(PHONE, "token").await.unwrap();
    assert_eq!(provider.send_count(), 1);
    assert_eq!(provider.latest_code_for(PHONE).as_deref(), Some("123456"));

    let identity = provider.confirm_code(&handle, "123456").await.unwrap();
    assert_eq!(identity.phone_number, PHONE);
    assert!(identity.is_new_user);
    assert_eq!(provider.identity_count(), 1);

    provider.delete_identity(&identity).await.unwrap();
    assert_eq!(provider.identity_count(), 0);
}

#[tokio::test]
async fn test_random_code_is_six_digits() {
    let provider = MockOtpProvider::default();
    provider.send_verification_code(PHONE, "token").await.unwrap();

    let code = provider.latest_code_for(PHONE).unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_wrong_code_keeps_session_open() {
    let provider = MockOtpProvider::new(Some("123456".to_string()));
    let handle = provider.send_verification_code(PHONE, "token").await.unwrap();

    let error = provider.confirm_code(&handle, "000000").await.unwrap_err();
    assert_eq!(
        translate_provider_code(&error.code),
        VerificationErrorKind::InvalidCode
    );
    assert!(provider.confirm_code(&handle, "123456").await.is_ok());

    // The session is consumed by the successful confirmation
    let error = provider.confirm_code(&handle, "123456").await.unwrap_err();
    assert_eq!(
        translate_provider_code(&error.code),
        VerificationErrorKind::CodeExpired
    );
}

#[tokio::test]
async fn test_rejects_bad_input() {
    let provider = MockOtpProvider::default();

    let error = provider.send_verification_code("4155552671", "token").await.unwrap_err();
    assert_eq!(
        translate_provider_code(&error.code),
        VerificationErrorKind::PhoneInvalid
    );

    let error = provider.send_verification_code(PHONE, "").await.unwrap_err();
    assert_eq!(
        translate_provider_code(&error.code),
        VerificationErrorKind::CaptchaFailed
    );
    assert_eq!(provider.send_count(), 0);
}

#[tokio::test]
async fn test_simulated_failure() {
    let provider = MockOtpProvider::with_options(None, true);

    let error = provider.send_verification_code(PHONE, "token").await.unwrap_err();
    assert_eq!(
        translate_provider_code(&error.code),
        VerificationErrorKind::NetworkError
    );
}

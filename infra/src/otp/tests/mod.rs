//! Unit tests for OTP providers

mod mock_otp_tests;

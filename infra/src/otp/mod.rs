//! OTP Provider Module
//!
//! Implementations of the `OtpProvider` contract the verification controller
//! issues and confirms codes through.
//!
//! ## Features
//!
//! - **Identity toolkit**: production phone auth over REST, emulator compatible
//! - **Mock implementation**: logs codes to the console, outside production only
//! - **Security**: phone number masking in logs

use std::sync::Arc;

use pv_core::services::verification::OtpProvider;
use pv_shared::config::Environment;

pub mod identity_toolkit;
pub mod mock_otp;

pub use identity_toolkit::IdentityToolkitProvider;
pub use mock_otp::MockOtpProvider;

use crate::config::OtpProviderConfig;
use crate::InfrastructureError;

#[cfg(test)]
mod tests;

/// Create an OTP provider based on configuration
///
/// A provider that cannot be built is an error, never replaced by the mock.
/// The mock itself is refused in production.
pub fn create_otp_provider(
    config: &OtpProviderConfig,
    environment: Environment,
) -> Result<Arc<dyn OtpProvider>, InfrastructureError> {
    match config.provider.as_str() {
        "mock" if environment.is_production() => Err(InfrastructureError::Config(
            "mock OTP provider cannot be used in production".to_string(),
        )),
        "mock" => {
            tracing::warn!(
                environment = %environment,
                "Using mock OTP provider, codes are logged instead of sent"
            );
            Ok(Arc::new(MockOtpProvider::new(config.mock_code.clone())))
        }
        "identity-toolkit" => {
            let provider = IdentityToolkitProvider::new(config).map_err(|e| {
                tracing::error!("Failed to initialize identity toolkit provider: {}", e);
                e
            })?;
            Ok(Arc::new(provider))
        }
        other => Err(InfrastructureError::Config(format!(
            "Unknown OTP provider '{}'",
            other
        ))),
    }
}

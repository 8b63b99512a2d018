//! Configuration module
//!
//! - `environment` - Environment detection and logging configuration
//! - `verification` - Resend, attempt and expiry policy for phone verification

pub mod environment;
pub mod verification;

// Re-export commonly used types
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use verification::VerificationPolicyConfig;

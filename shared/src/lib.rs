//! Shared utilities and common types for the phone verification workspace
//!
//! This crate provides functionality used across the verification crates:
//! - Configuration types (environment, logging, verification policy)
//! - Phone number utilities (E.164 normalization, masking)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{Environment, LogFormat, LoggingConfig, VerificationPolicyConfig};
pub use utils::phone;

//! # Phone Verification Core
//!
//! Client-resident phone-ownership verification for the RenovEasy marketplace.
//! This crate contains the verification session entity, the closed error
//! taxonomy, the provider contracts, and the services that together prove a
//! user controls a phone number via a one-time SMS code: phone normalization,
//! challenge widget ownership, resend cooldowns, attempt caps, code expiry and
//! the controller state machine that orchestrates them.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;

//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

// Re-export all error types and utilities
pub use types::{extract_chinese_message, extract_english_message, VerificationErrorKind};

use pv_shared::phone::PhoneError;
use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Verification(#[from] VerificationErrorKind),

    #[error(transparent)]
    Phone(#[from] PhoneError),
}

pub type DomainResult<T> = Result<T, DomainError>;

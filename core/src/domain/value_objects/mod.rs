//! Value objects representing immutable domain concepts.

pub mod attempt_counter;
pub mod confirmation;

// Re-export commonly used types
pub use attempt_counter::AttemptCounter;
pub use confirmation::{ConfirmationHandle, VerifiedIdentity};

//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    AnchorHost, ChallengeWidget, Clock, OperationOutcome, OtpProvider, SystemClock,
    VerificationController, VerificationSnapshot,
};

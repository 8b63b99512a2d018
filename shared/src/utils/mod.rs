//! Common utility functions

pub mod phone;

// Re-export commonly used utilities
pub use phone::{PhoneError, is_submittable, mask_phone, normalize_to_e164};

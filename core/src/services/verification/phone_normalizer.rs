//! Canonicalizes user-entered phone numbers to E.164

use pv_shared::phone::{self, PhoneError};

/// Pure phone normalizer bound to a default country calling code
#[derive(Debug, Clone)]
pub struct PhoneNormalizer {
    default_calling_code: String,
}

impl PhoneNormalizer {
    pub fn new(default_calling_code: impl Into<String>) -> Self {
        let code: String = default_calling_code.into();
        Self {
            default_calling_code: code.trim_start_matches('+').to_string(),
        }
    }

    /// Normalize raw input to E.164
    pub fn normalize(&self, raw: &str) -> Result<String, PhoneError> {
        phone::normalize_to_e164(raw, &self.default_calling_code)
    }

    /// Whether the phone entry form should allow submission
    pub fn is_submittable(&self, raw: &str) -> bool {
        phone::is_submittable(raw)
    }
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new("1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_country_code_is_applied() {
        let normalizer = PhoneNormalizer::new("+44");
        assert_eq!(normalizer.normalize("20 7123 4567"), Ok("+442071234567".to_string()));
        assert_eq!(
            PhoneNormalizer::default().normalize("415-555-2671"),
            Ok("+14155552671".to_string())
        );
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let normalizer = PhoneNormalizer::default();
        assert!(normalizer.is_submittable("+0 000 000 0000"));
        assert_eq!(
            normalizer.normalize("+0 000 000 0000"),
            Err(PhoneError::Malformed)
        );
    }
}

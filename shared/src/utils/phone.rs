//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// E.164: `+`, a country code not starting with 0, 7 to 15 digits in total
static E164_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").unwrap());

/// Number of national digits expected when no country code is given
pub const NATIONAL_NUMBER_DIGITS: usize = 10;

/// Minimum digit count at which the phone entry form becomes submittable
pub const MIN_SUBMITTABLE_DIGITS: usize = 10;

/// Reasons a raw phone input cannot be canonicalized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Phone number is empty | 电话号码为空")]
    Empty,

    #[error("Phone number has {digits} digits, expected at least {min} | 电话号码位数不足")]
    TooShort { digits: usize, min: usize },

    #[error("Phone number is not a valid international number | 无效的国际电话号码")]
    Malformed,
}

/// Strip common formatting characters, keeping digits and `+`
pub fn strip_formatting(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Count the digits in a raw input
pub fn digit_count(phone: &str) -> usize {
    phone.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Whether the raw input has enough digits to enable the submit action
///
/// This says nothing about normalization succeeding.
pub fn is_submittable(phone: &str) -> bool {
    digit_count(phone) >= MIN_SUBMITTABLE_DIGITS
}

/// Check if a phone number is valid E.164
pub fn is_valid_e164(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Normalize raw user input to E.164
///
/// Accepted shapes:
/// - `+<digits>` with any formatting
/// - `00<digits>` international prefix
/// - exactly ten national digits, `default_calling_code` is prepended
/// - eleven digits already starting with `default_calling_code`
pub fn normalize_to_e164(raw: &str, default_calling_code: &str) -> Result<String, PhoneError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PhoneError::Empty);
    }

    let cleaned = strip_formatting(trimmed);
    let digits: String = cleaned.chars().filter(|c| c.is_ascii_digit()).collect();

    let candidate = if cleaned.starts_with('+') {
        // A second '+' anywhere is garbage, not formatting
        if cleaned[1..].contains('+') {
            return Err(PhoneError::Malformed);
        }
        format!("+{}", digits)
    } else if let Some(rest) = digits.strip_prefix("00") {
        format!("+{}", rest)
    } else if digits.len() < NATIONAL_NUMBER_DIGITS {
        return Err(PhoneError::TooShort {
            digits: digits.len(),
            min: NATIONAL_NUMBER_DIGITS,
        });
    } else if digits.len() == NATIONAL_NUMBER_DIGITS {
        format!("+{}{}", default_calling_code, digits)
    } else if digits.len() == NATIONAL_NUMBER_DIGITS + default_calling_code.len()
        && digits.starts_with(default_calling_code)
    {
        format!("+{}", digits)
    } else {
        return Err(PhoneError::Malformed);
    };

    if is_valid_e164(&candidate) {
        Ok(candidate)
    } else {
        Err(PhoneError::Malformed)
    }
}

/// Mask a phone number for logging (show only last 4 digits)
pub fn mask_phone(phone: &str) -> String {
    let count = phone.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = phone.chars().skip(count - 4).collect();
    format!("***{}", tail)
}

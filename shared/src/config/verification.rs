//! Phone verification policy configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Resend, attempt and expiry policy applied by the verification controller
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationPolicyConfig {
    /// Maximum number of resends after the first code
    #[serde(default = "default_max_resends")]
    pub max_resends: u32,

    /// Maximum number of wrong-code confirmations per issued code
    #[serde(default = "default_max_verifications")]
    pub max_verifications: u32,

    /// Seconds a delivered code stays valid
    #[serde(default = "default_code_validity_seconds")]
    pub code_validity_seconds: u64,

    /// Escalating resend wait times in seconds, last entry repeats
    #[serde(default = "default_cooldown_table")]
    pub cooldown_table_seconds: Vec<u64>,

    /// How often the expiry and cooldown timers are polled
    #[serde(default = "default_timer_poll_interval_ms")]
    pub timer_poll_interval_ms: u64,

    /// Element id the invisible challenge widget is attached to
    #[serde(default = "default_captcha_anchor_id")]
    pub captcha_anchor_id: String,

    /// Calling code prepended to national numbers
    #[serde(default = "default_country_calling_code")]
    pub default_country_calling_code: String,

    /// Number of digits in a delivered code
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

impl Default for VerificationPolicyConfig {
    fn default() -> Self {
        Self {
            max_resends: default_max_resends(),
            max_verifications: default_max_verifications(),
            code_validity_seconds: default_code_validity_seconds(),
            cooldown_table_seconds: default_cooldown_table(),
            timer_poll_interval_ms: default_timer_poll_interval_ms(),
            captcha_anchor_id: default_captcha_anchor_id(),
            default_country_calling_code: default_country_calling_code(),
            code_length: default_code_length(),
        }
    }
}

impl VerificationPolicyConfig {
    /// Load the policy from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_resends: parse_env("VERIFICATION_MAX_RESENDS").unwrap_or(defaults.max_resends),
            max_verifications: parse_env("VERIFICATION_MAX_ATTEMPTS")
                .unwrap_or(defaults.max_verifications),
            code_validity_seconds: parse_env("VERIFICATION_CODE_VALIDITY_SECONDS")
                .unwrap_or(defaults.code_validity_seconds),
            cooldown_table_seconds: env::var("VERIFICATION_COOLDOWN_TABLE")
                .ok()
                .and_then(|v| parse_cooldown_table(&v))
                .unwrap_or(defaults.cooldown_table_seconds),
            timer_poll_interval_ms: parse_env("VERIFICATION_TIMER_POLL_INTERVAL_MS")
                .unwrap_or(defaults.timer_poll_interval_ms),
            captcha_anchor_id: env::var("VERIFICATION_CAPTCHA_ANCHOR_ID")
                .unwrap_or(defaults.captcha_anchor_id),
            default_country_calling_code: env::var("VERIFICATION_DEFAULT_COUNTRY_CODE")
                .unwrap_or(defaults.default_country_calling_code),
            code_length: parse_env("VERIFICATION_CODE_LENGTH").unwrap_or(defaults.code_length),
        }
    }
}

/// Parse a comma separated list such as `60,60,120,300`
///
/// Returns `None` for an empty or malformed table.
pub fn parse_cooldown_table(raw: &str) -> Option<Vec<u64>> {
    let table: Option<Vec<u64>> = raw
        .split(',')
        .map(|entry| entry.trim().parse().ok())
        .collect();
    table.filter(|t| !t.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn default_max_resends() -> u32 {
    3
}

fn default_max_verifications() -> u32 {
    5
}

fn default_code_validity_seconds() -> u64 {
    600 // 10 minutes
}

fn default_cooldown_table() -> Vec<u64> {
    vec![60, 60, 120, 300]
}

fn default_timer_poll_interval_ms() -> u64 {
    1000
}

fn default_captcha_anchor_id() -> String {
    String::from("recaptcha-container")
}

fn default_country_calling_code() -> String {
    String::from("1")
}

fn default_code_length() -> usize {
    6
}

//! Configuration management for infrastructure services
//!
//! Handles:
//! - OTP provider selection and credentials
//! - Verification policy and logging settings
//! - Environment-specific `.env` files

use serde::{Deserialize, Serialize};
use std::env;

use pv_shared::config::{Environment, LoggingConfig, VerificationPolicyConfig};

/// Production identity toolkit endpoint
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// OTP provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpProviderConfig {
    /// Provider ("identity-toolkit", "mock")
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Web API key of the identity project
    #[serde(default)]
    pub api_key: String,
    /// REST base URL, points at the emulator in development
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for API requests in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Code the mock provider accepts; random per send when unset
    #[serde(default)]
    pub mock_code: Option<String>,
}

impl Default for OtpProviderConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            mock_code: None,
        }
    }
}

impl OtpProviderConfig {
    /// Load from `OTP_*` variables
    ///
    /// `FIREBASE_AUTH_EMULATOR_HOST` redirects the REST adapter to a local
    /// emulator when no explicit `OTP_BASE_URL` is given.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = env::var("OTP_BASE_URL").ok().or_else(|| {
            env::var("FIREBASE_AUTH_EMULATOR_HOST")
                .ok()
                .map(|host| emulator_base_url(&host))
        });

        Self {
            provider: env::var("OTP_PROVIDER").unwrap_or(defaults.provider),
            api_key: env::var("OTP_API_KEY").unwrap_or_default(),
            base_url: base_url.unwrap_or(defaults.base_url),
            request_timeout_secs: env::var("OTP_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            mock_code: env::var("OTP_MOCK_CODE").ok().filter(|c| !c.is_empty()),
        }
    }
}

/// REST base URL served by a local auth emulator
pub fn emulator_base_url(host: &str) -> String {
    format!("http://{}/identitytoolkit.googleapis.com/v1", host.trim_end_matches('/'))
}

fn default_provider() -> String {
    "mock".to_string()
}

fn default_base_url() -> String {
    DEFAULT_IDENTITY_TOOLKIT_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Infrastructure configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfrastructureConfig {
    pub environment: Environment,
    pub logging: LoggingConfig,
    pub verification: VerificationPolicyConfig,
    pub otp: OtpProviderConfig,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        let environment = Environment::default();
        Self {
            environment,
            logging: LoggingConfig::for_environment(environment),
            verification: VerificationPolicyConfig::default(),
            otp: OtpProviderConfig::default(),
        }
    }
}

/// Load infrastructure configuration from the environment
///
/// The environment-specific file (`.env.development`, ...) is read first, then
/// `.env`; variables already set are never overridden.
pub fn load_config() -> InfrastructureConfig {
    let environment = Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();
    dotenvy::dotenv().ok();

    InfrastructureConfig {
        environment,
        logging: LoggingConfig::from_env(),
        verification: VerificationPolicyConfig::from_env(),
        otp: OtpProviderConfig::from_env(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OtpProviderConfig::default();
        assert_eq!(config.provider, "mock");
        assert_eq!(config.base_url, DEFAULT_IDENTITY_TOOLKIT_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.mock_code.is_none());
    }

    #[test]
    fn test_emulator_base_url() {
        assert_eq!(
            emulator_base_url("localhost:9099/"),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1"
        );
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: OtpProviderConfig =
            serde_json::from_str(r#"{"provider": "identity-toolkit", "api_key": "k"}"#).unwrap();
        assert_eq!(config.provider, "identity-toolkit");
        assert_eq!(config.api_key, "k");
        assert_eq!(config.base_url, DEFAULT_IDENTITY_TOOLKIT_URL);
    }
}

//! # Infrastructure Layer
//!
//! Concrete adapters for the phone verification controller in `pv_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **OTP**: identity toolkit REST provider (reqwest) and a mock provider
//! - **Challenge**: in-memory anchor host and a headless challenge widget
//! - **Config**: provider settings loaded from the environment
//! - **Telemetry**: `tracing-subscriber` installation from `LoggingConfig`

use std::sync::Arc;

use pv_core::errors::DomainError;
use pv_core::services::verification::{
    AnchorHost, ChallengeWidget, OtpProvider, VerificationController,
};

pub mod challenge;
pub mod config;
pub mod otp;
pub mod telemetry;

pub use config::{load_config, InfrastructureConfig, OtpProviderConfig};
pub use otp::create_otp_provider;
pub use telemetry::init_tracing;

/// Infrastructure service container
#[derive(Clone)]
pub struct InfrastructureServices {
    pub config: InfrastructureConfig,
    pub otp_provider: Arc<dyn OtpProvider>,
}

impl InfrastructureServices {
    /// Build the services described by `config`
    ///
    /// Fails when the configured OTP provider cannot be built.
    pub fn new(config: InfrastructureConfig) -> Result<Self, InfrastructureError> {
        let otp_provider = create_otp_provider(&config.otp, config.environment)?;
        Ok(Self {
            config,
            otp_provider,
        })
    }

    /// Create a controller for one verification UI bound to the given page
    pub fn verification_controller(
        &self,
        widget: Arc<dyn ChallengeWidget>,
        host: Arc<dyn AnchorHost>,
    ) -> Result<VerificationController, InfrastructureError> {
        let controller = VerificationController::new(
            self.config.verification.clone(),
            self.otp_provider.clone(),
            widget,
            host,
        )?;
        Ok(controller)
    }
}

/// Initialize infrastructure services
///
/// This function:
/// - Loads `.env` files and configuration
/// - Installs the tracing subscriber
/// - Selects the OTP provider
pub fn initialize() -> Result<InfrastructureServices, InfrastructureError> {
    let config = load_config();
    init_tracing(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        provider = %config.otp.provider,
        event = "infrastructure_init",
        "Initializing infrastructure services"
    );

    let services = InfrastructureServices::new(config)?;
    tracing::info!(
        provider = services.otp_provider.provider_name(),
        "Infrastructure services initialized successfully"
    );
    Ok(services)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP client construction or request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// OTP provider error
    #[error("OTP provider error: {0}")]
    Provider(String),

    /// Controller construction rejected the policy
    #[error(transparent)]
    Domain(#[from] DomainError),
}

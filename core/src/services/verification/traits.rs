//! Traits for the external collaborators of the verification flow

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::value_objects::{ConfirmationHandle, VerifiedIdentity};

use super::types::{ChallengeCallbacks, ProviderError, WidgetId};

/// External phone-identity service that delivers and confirms SMS codes
#[async_trait]
pub trait OtpProvider: Send + Sync {
    /// Send a code to an E.164 number, proving humanity with a challenge token
    async fn send_verification_code(
        &self,
        phone_e164: &str,
        challenge_token: &str,
    ) -> Result<ConfirmationHandle, ProviderError>;

    /// Confirm a code against the challenge the handle was issued for
    async fn confirm_code(
        &self,
        handle: &ConfirmationHandle,
        code: &str,
    ) -> Result<VerifiedIdentity, ProviderError>;

    /// Delete the provisional identity created by a successful confirmation
    async fn delete_identity(&self, identity: &VerifiedIdentity) -> Result<(), ProviderError>;

    /// Human-readable provider name for logs
    fn provider_name(&self) -> &str;
}

/// Page that hosts the anchor element the challenge widget attaches to
pub trait AnchorHost: Send + Sync {
    /// Whether an element with this id exists
    fn contains(&self, anchor_id: &str) -> bool;
    /// Create an element with this id
    fn create(&self, anchor_id: &str) -> Result<(), String>;
    /// Remove the element with this id, if present
    fn remove(&self, anchor_id: &str);
}

/// Invisible human-verification widget
///
/// A widget can be rendered into a given anchor only once; rendering it again
/// into an initialized anchor fails.
#[async_trait]
pub trait ChallengeWidget: Send + Sync {
    /// Render the widget into an anchor and wire its callbacks
    fn render(&self, anchor_id: &str, callbacks: ChallengeCallbacks) -> Result<WidgetId, String>;
    /// Run the challenge and return a fresh token
    async fn execute(&self, widget: WidgetId) -> Result<String, String>;
    /// Re-arm the widget after a failed challenge
    fn reset(&self, widget: WidgetId);
    /// Detach the widget from its anchor
    fn clear(&self, widget: WidgetId);
}

/// Source of the current time for cooldowns and expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

//! Mock OTP provider for development and testing
//!
//! Logs every issued code instead of sending an SMS, so a developer can read
//! the code from the console.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use uuid::Uuid;

use pv_core::domain::value_objects::{ConfirmationHandle, VerifiedIdentity};
use pv_core::services::verification::{OtpProvider, ProviderError};
use pv_shared::phone::{is_valid_e164, mask_phone};

/// How long an issued mock code stays valid
const MOCK_CODE_VALIDITY_SECONDS: i64 = 600;

struct PendingCode {
    phone_number: String,
    code: String,
    issued_at: DateTime<Utc>,
}

#[derive(Default)]
struct MockState {
    pending: HashMap<String, PendingCode>,
    identities: HashSet<String>,
}

/// Mock OTP provider
///
/// This implementation:
/// - Accepts a fixed code, or generates a random six-digit code per send
/// - Expires codes after ten minutes
/// - Tracks sends and provisional identities for tests
/// - Can simulate transport failures
#[derive(Clone)]
pub struct MockOtpProvider {
    fixed_code: Option<String>,
    simulate_failure: bool,
    send_count: Arc<AtomicU64>,
    state: Arc<Mutex<MockState>>,
}

impl MockOtpProvider {
    /// Create a mock provider; `fixed_code` is accepted for every send
    pub fn new(fixed_code: Option<String>) -> Self {
        Self::with_options(fixed_code, false)
    }

    /// Create a mock provider with configurable options
    pub fn with_options(fixed_code: Option<String>, simulate_failure: bool) -> Self {
        Self {
            fixed_code,
            simulate_failure,
            send_count: Arc::new(AtomicU64::new(0)),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Total number of codes issued
    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Most recent outstanding code for a phone number
    pub fn latest_code_for(&self, phone_e164: &str) -> Option<String> {
        self.state()
            .pending
            .values()
            .filter(|p| p.phone_number == phone_e164)
            .max_by_key(|p| p.issued_at)
            .map(|p| p.code.clone())
    }

    /// Number of provisional identities not yet deleted
    pub fn identity_count(&self) -> usize {
        self.state().identities.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_code(&self) -> String {
        match &self.fixed_code {
            Some(code) => code.clone(),
            None => format!("{:06}", rand::thread_rng().gen_range(0..1_000_000)),
        }
    }
}

impl Default for MockOtpProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl OtpProvider for MockOtpProvider {
    async fn send_verification_code(
        &self,
        phone_e164: &str,
        challenge_token: &str,
    ) -> Result<ConfirmationHandle, ProviderError> {
        if !is_valid_e164(phone_e164) {
            return Err(ProviderError::new(
                "auth/invalid-phone-number",
                format!("Invalid phone number format: {}", mask_phone(phone_e164)),
            ));
        }
        if challenge_token.is_empty() {
            return Err(ProviderError::new(
                "auth/missing-app-credential",
                "No challenge token supplied",
            ));
        }
        if self.simulate_failure {
            warn!(
                phone = %mask_phone(phone_e164),
                "Mock OTP provider simulating failure"
            );
            return Err(ProviderError::network("Simulated transport failure"));
        }

        let session_info = format!("mock_{}", Uuid::new_v4());
        let code = self.next_code();
        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            target: "otp_provider",
            provider = "mock",
            phone = %mask_phone(phone_e164),
            code = %code,
            message_number = count,
            "Mock verification code issued"
        );

        self.state().pending.insert(
            session_info.clone(),
            PendingCode {
                phone_number: phone_e164.to_string(),
                code,
                issued_at: Utc::now(),
            },
        );
        Ok(ConfirmationHandle::new(session_info))
    }

    async fn confirm_code(
        &self,
        handle: &ConfirmationHandle,
        code: &str,
    ) -> Result<VerifiedIdentity, ProviderError> {
        let mut state = self.state();
        let Some(pending) = state.pending.get(handle.as_str()) else {
            return Err(ProviderError::new(
                "auth/invalid-verification-id",
                "Unknown verification session",
            ));
        };

        if Utc::now() - pending.issued_at >= Duration::seconds(MOCK_CODE_VALIDITY_SECONDS) {
            state.pending.remove(handle.as_str());
            return Err(ProviderError::new("auth/code-expired", "Code expired"));
        }
        if pending.code != code {
            return Err(ProviderError::new(
                "auth/invalid-verification-code",
                "Wrong verification code",
            ));
        }

        let phone_number = pending.phone_number.clone();
        state.pending.remove(handle.as_str());
        let uid = Uuid::new_v4().to_string();
        state.identities.insert(uid.clone());

        Ok(VerifiedIdentity {
            uid,
            phone_number,
            id_token: format!("mock-id-token-{}", Uuid::new_v4()),
            is_new_user: true,
        })
    }

    async fn delete_identity(&self, identity: &VerifiedIdentity) -> Result<(), ProviderError> {
        if self.state().identities.remove(&identity.uid) {
            Ok(())
        } else {
            Err(ProviderError::new("auth/user-not-found", "No such identity"))
        }
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}

//! Verification controller: the state machine behind the three-step UI
//!
//! ```text
//! idle --send--> sending --ok--> code_sent --verify--> verifying --ok--> verified
//!                sending --err--> error
//! code_sent --resend--> sending            (resend ceiling, cooldown)
//! verifying --wrong code--> code_sent      (wrong-code ceiling)
//! verifying --other error--> code_sent
//! any --reset--> idle
//! ```
//!
//! Each public operation suspends only while the challenge widget and the
//! provider are working. Session state sits behind a mutex that is never held
//! across an await, and the step guards reject a second call while one is in
//! flight. After every await the continuation checks the liveness flag and
//! the session generation before committing. This is a best-effort staleness
//! guard, not cancellation: the outbound request still completes, its result
//! is simply discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use pv_shared::config::VerificationPolicyConfig;
use pv_shared::phone::mask_phone;

use crate::domain::entities::{VerificationSession, VerificationStep};
use crate::domain::value_objects::{ConfirmationHandle, VerifiedIdentity};
use crate::errors::{DomainError, DomainResult, VerificationErrorKind};

use super::attempt_limiter::AttemptLimiter;
use super::captcha::CaptchaChallengeProvider;
use super::cooldown::CooldownPolicy;
use super::expiry_timer::{SessionExpiryTimer, MAX_CODE_VALIDITY_SECONDS};
use super::otp_client::OtpSessionClient;
use super::phone_normalizer::PhoneNormalizer;
use super::traits::{AnchorHost, ChallengeWidget, Clock, OtpProvider, SystemClock};
use super::types::{ChallengeCallbacks, OperationOutcome, VerificationSnapshot};

struct ControllerState {
    session: VerificationSession,
    /// Bumped on every reset so continuations of the old session are dropped
    generation: u64,
}

fn lock_state(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Orchestrates phone verification for one UI flow
pub struct VerificationController {
    config: VerificationPolicyConfig,
    normalizer: PhoneNormalizer,
    captcha: CaptchaChallengeProvider,
    otp: OtpSessionClient,
    cooldown: CooldownPolicy,
    limiter: AttemptLimiter,
    expiry: SessionExpiryTimer,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<ControllerState>>,
    /// Cleared when the owning UI is torn down
    live: AtomicBool,
}

impl VerificationController {
    /// Create a controller using the wall clock
    pub fn new(
        config: VerificationPolicyConfig,
        provider: Arc<dyn OtpProvider>,
        widget: Arc<dyn ChallengeWidget>,
        host: Arc<dyn AnchorHost>,
    ) -> DomainResult<Self> {
        Self::with_clock(config, provider, widget, host, Arc::new(SystemClock))
    }

    /// Create a controller with an explicit clock
    pub fn with_clock(
        config: VerificationPolicyConfig,
        provider: Arc<dyn OtpProvider>,
        widget: Arc<dyn ChallengeWidget>,
        host: Arc<dyn AnchorHost>,
        clock: Arc<dyn Clock>,
    ) -> DomainResult<Self> {
        validate_policy(&config)?;

        let limiter = AttemptLimiter::new(config.max_resends, config.max_verifications);
        let state = ControllerState {
            session: limiter.new_session(),
            generation: 0,
        };

        Ok(Self {
            normalizer: PhoneNormalizer::new(config.default_country_calling_code.clone()),
            captcha: CaptchaChallengeProvider::new(widget, host),
            otp: OtpSessionClient::new(provider),
            cooldown: CooldownPolicy::new(config.cooldown_table_seconds.clone()),
            limiter,
            expiry: SessionExpiryTimer::new(
                config.code_validity_seconds,
                config.timer_poll_interval_ms,
            ),
            clock,
            state: Arc::new(Mutex::new(state)),
            live: AtomicBool::new(true),
            config,
        })
    }

    pub fn config(&self) -> &VerificationPolicyConfig {
        &self.config
    }

    /// Whether the owning UI is still mounted
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Whether the phone entry form may be submitted
    pub fn is_phone_submittable(&self, raw: &str) -> bool {
        self.normalizer.is_submittable(raw)
    }

    /// Identifier of the current session
    pub fn session_id(&self) -> Uuid {
        lock_state(&self.state).session.id()
    }

    /// Identity confirmed by the provider, once verified
    pub fn verified_identity(&self) -> Option<VerifiedIdentity> {
        lock_state(&self.state).session.verified_identity().cloned()
    }

    /// Current observable state
    pub fn snapshot(&self) -> VerificationSnapshot {
        let now = self.clock.now();
        let state = lock_state(&self.state);
        self.snapshot_of(&state.session, now)
    }

    /// Send the first code, or resend to the same number
    pub async fn send_verification_code(&self, phone: &str) -> OperationOutcome {
        if !self.is_live() {
            tracing::debug!(event = "send_after_teardown", "Ignoring send after teardown");
            return OperationOutcome::ignored();
        }

        let (phone_e164, generation) = {
            let now = self.clock.now();
            let mut state = lock_state(&self.state);
            let generation = state.generation;
            let session = &mut state.session;

            if matches!(
                session.step(),
                VerificationStep::Sending | VerificationStep::Verifying | VerificationStep::Verified
            ) {
                tracing::debug!(
                    step = %session.step(),
                    event = "send_ignored",
                    "No send transition from current step"
                );
                return OperationOutcome::ignored();
            }
            session.clear_error();

            let phone_e164 = match self.normalizer.normalize(phone) {
                Ok(normalized) => normalized,
                Err(e) => {
                    tracing::warn!(
                        phone = %mask_phone(phone),
                        reason = %e,
                        event = "invalid_phone_format",
                        "Rejected phone number before sending"
                    );
                    session.record_error(VerificationErrorKind::PhoneInvalid);
                    return OperationOutcome::failure(VerificationErrorKind::PhoneInvalid);
                }
            };

            let is_resend = session.has_issued_code();
            if is_resend {
                if let Err(kind) = self.check_resend(session, &phone_e164, now) {
                    session.record_error(kind);
                    return OperationOutcome::failure(kind);
                }
            }

            session.begin_sending(&phone_e164, is_resend);
            tracing::info!(
                phone = %mask_phone(&phone_e164),
                session = %session.id(),
                is_resend = is_resend,
                resend_attempts = session.resend_attempts().count(),
                event = "otp_send_started",
                "Requesting verification code"
            );
            (phone_e164, generation)
        };

        let result = self.request_code(&phone_e164, generation).await;

        let (outcome, rearm_widget) = {
            let mut state = lock_state(&self.state);
            if !self.is_current(&state, generation) {
                tracing::debug!(event = "stale_send_discarded", "Discarding stale send result");
                return OperationOutcome::ignored();
            }
            match result {
                Ok(handle) => {
                    let now = self.clock.now();
                    let cooldown = self
                        .cooldown
                        .after_send(state.session.resend_attempts().count());
                    state.session.code_issued(handle, now, cooldown);
                    tracing::info!(
                        phone = %mask_phone(&phone_e164),
                        cooldown_seconds = cooldown,
                        event = "otp_code_issued",
                        "Verification code issued"
                    );
                    (OperationOutcome::success(), false)
                }
                Err(kind) => {
                    state.session.send_failed(kind);
                    (
                        OperationOutcome::failure(kind),
                        kind == VerificationErrorKind::CaptchaFailed,
                    )
                }
            }
        };

        if rearm_widget {
            self.captcha.reset_widget();
        }
        outcome
    }

    /// Confirm the code the user typed
    pub async fn verify_code(&self, code: &str) -> OperationOutcome {
        if !self.is_live() {
            tracing::debug!(event = "verify_after_teardown", "Ignoring verify after teardown");
            return OperationOutcome::ignored();
        }
        let code = code.trim();

        let (handle, generation) = {
            let now = self.clock.now();
            let mut state = lock_state(&self.state);
            let generation = state.generation;
            let session = &mut state.session;

            match session.step() {
                VerificationStep::Verified => return OperationOutcome::success(),
                VerificationStep::CodeSent => {}
                step => {
                    tracing::debug!(
                        step = %step,
                        event = "verify_ignored",
                        "No verify transition from current step"
                    );
                    return OperationOutcome::ignored();
                }
            }
            session.clear_error();

            if let Err(kind) = self.check_verify(session, code, now) {
                session.record_error(kind);
                return OperationOutcome::failure(kind);
            }

            match session.begin_verifying() {
                Some(handle) => (handle, generation),
                None => return OperationOutcome::ignored(),
            }
        };

        let result = self.otp.confirm(&handle, code).await;

        let (outcome, to_discard) = {
            let mut state = lock_state(&self.state);
            if !self.is_current(&state, generation) {
                tracing::debug!(event = "stale_verify_discarded", "Discarding stale verify result");
                (OperationOutcome::ignored(), result.ok())
            } else {
                match result {
                    Ok(identity) => {
                        state.session.mark_verified(identity.clone());
                        tracing::info!(
                            session = %state.session.id(),
                            event = "phone_verified",
                            "Phone number verified"
                        );
                        (OperationOutcome::success(), Some(identity))
                    }
                    Err(VerificationErrorKind::InvalidCode) => {
                        state.session.wrong_code();
                        let attempts = state.session.verification_attempts();
                        tracing::warn!(
                            verification_attempts = attempts.count(),
                            remaining_attempts = attempts.remaining(),
                            event = "otp_wrong_code",
                            "Wrong verification code"
                        );
                        (
                            OperationOutcome::failure(VerificationErrorKind::InvalidCode),
                            None,
                        )
                    }
                    Err(kind) => {
                        state.session.confirm_failed(kind);
                        (OperationOutcome::failure(kind), None)
                    }
                }
            }
        };

        // The step is already committed, cleanup cannot retract it
        if let Some(identity) = to_discard {
            self.otp.discard_provisional_identity(&identity).await;
        }
        outcome
    }

    /// Discard the session and start over from phone entry
    pub fn reset_verification(&self) {
        self.captcha.dispose();
        let mut state = lock_state(&self.state);
        let previous = state.session.id();
        state.generation += 1;
        state.session = self.limiter.new_session();
        tracing::info!(
            previous_session = %previous,
            session = %state.session.id(),
            event = "verification_reset",
            "Verification session reset"
        );
    }

    /// The owning UI went away: release the widget and ignore late results
    pub fn teardown(&self) {
        if !self.live.swap(false, Ordering::SeqCst) {
            return;
        }
        self.reset_verification();
        tracing::debug!(event = "verification_teardown", "Verification controller torn down");
    }

    /// One cooperative timer tick: latch code expiry and report the countdown
    pub fn poll_timers(&self) -> VerificationSnapshot {
        let now = self.clock.now();
        let mut state = lock_state(&self.state);
        let session = &mut state.session;

        if session.step() == VerificationStep::CodeSent && !session.session_expired() {
            if let Some(sent_at) = session.code_sent_at() {
                if self.expiry.is_expired(sent_at, now) {
                    session.mark_expired();
                    tracing::info!(
                        session = %session.id(),
                        event = "otp_session_expired",
                        "Verification code expired"
                    );
                }
            }
        }
        self.snapshot_of(&state.session, now)
    }

    /// Drive [`VerificationController::poll_timers`] on the configured interval
    ///
    /// The task ends once the controller is dropped or torn down.
    pub fn spawn_timers(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::downgrade(self);
        let period = self.expiry.poll_interval();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                if !controller.is_live() {
                    break;
                }
                controller.poll_timers();
            }
        })
    }

    async fn request_code(
        &self,
        phone_e164: &str,
        generation: u64,
    ) -> Result<ConfirmationHandle, VerificationErrorKind> {
        let challenge = self.captcha.get_or_create(
            &self.config.captcha_anchor_id,
            self.challenge_callbacks(generation),
        )?;
        let token = self.captcha.token(&challenge).await?;
        self.otp.initiate(phone_e164, &token).await
    }

    fn check_resend(
        &self,
        session: &VerificationSession,
        phone_e164: &str,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationErrorKind> {
        if session.phone_number() != Some(phone_e164) {
            tracing::warn!(
                phone = %mask_phone(phone_e164),
                event = "resend_phone_changed",
                "Resend requested for a different number"
            );
            return Err(VerificationErrorKind::PhoneInvalid);
        }
        self.limiter.check_resend(session)?;

        let remaining = session.resend_cooldown_remaining(now);
        if remaining > 0 {
            tracing::warn!(
                phone = %mask_phone(phone_e164),
                cooldown_remaining = remaining,
                event = "rate_limit_exceeded",
                "Resend requested during cooldown"
            );
            return Err(VerificationErrorKind::TooManyRequests);
        }
        Ok(())
    }

    fn check_verify(
        &self,
        session: &mut VerificationSession,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationErrorKind> {
        // The poller may not have run yet
        if !session.session_expired() {
            if let Some(sent_at) = session.code_sent_at() {
                if self.expiry.is_expired(sent_at, now) {
                    session.mark_expired();
                }
            }
        }
        if session.session_expired() {
            return Err(VerificationErrorKind::CodeExpired);
        }

        self.limiter.check_verify(session)?;

        if code.is_empty() {
            return Err(VerificationErrorKind::MissingCode);
        }
        if code.len() != self.config.code_length || !code.chars().all(|c| c.is_ascii_digit()) {
            tracing::warn!(
                code_length = code.len(),
                event = "invalid_code_format",
                "Invalid verification code format provided"
            );
            return Err(VerificationErrorKind::InvalidCode);
        }
        Ok(())
    }

    fn challenge_callbacks(&self, generation: u64) -> ChallengeCallbacks {
        let state = Arc::downgrade(&self.state);
        ChallengeCallbacks::new(
            |token: &str| {
                tracing::debug!(
                    token_length = token.len(),
                    event = "captcha_solved",
                    "Challenge solved"
                );
            },
            move || {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let mut state = lock_state(&state);
                if state.generation == generation {
                    state.session.record_error(VerificationErrorKind::CaptchaFailed);
                    tracing::info!(event = "captcha_expired", "Challenge token expired");
                }
            },
        )
    }

    fn is_current(&self, state: &ControllerState, generation: u64) -> bool {
        self.is_live() && state.generation == generation
    }

    fn snapshot_of(&self, session: &VerificationSession, now: DateTime<Utc>) -> VerificationSnapshot {
        let resends = session.resend_attempts();
        let verifications = session.verification_attempts();
        let code_outstanding = matches!(
            session.step(),
            VerificationStep::CodeSent | VerificationStep::Verifying
        );

        VerificationSnapshot {
            step: session.step(),
            phone_number: session.phone_number().map(str::to_string),
            last_error: session.last_error(),
            resend_cooldown_seconds: session.resend_cooldown_remaining(now),
            session_expired: session.session_expired(),
            resend_attempts: resends.count(),
            verification_attempts: verifications.count(),
            max_resends_reached: resends.is_exhausted(),
            max_verifications_reached: verifications.is_exhausted(),
            remaining_verification_attempts: verifications.remaining(),
            is_last_verification_attempt: verifications.is_last_attempt(),
            code_expires_in_seconds: session
                .code_sent_at()
                .filter(|_| code_outstanding)
                .map(|sent_at| self.expiry.remaining_seconds(sent_at, now)),
        }
    }
}

fn validate_policy(config: &VerificationPolicyConfig) -> DomainResult<()> {
    if config.code_length == 0 {
        return Err(DomainError::Validation {
            message: "code_length must be positive".to_string(),
        });
    }
    if config.code_validity_seconds == 0 || config.code_validity_seconds > MAX_CODE_VALIDITY_SECONDS
    {
        return Err(DomainError::Validation {
            message: format!(
                "code_validity_seconds must be between 1 and {}",
                MAX_CODE_VALIDITY_SECONDS
            ),
        });
    }
    if config.timer_poll_interval_ms == 0 {
        return Err(DomainError::Validation {
            message: "timer_poll_interval_ms must be positive".to_string(),
        });
    }
    let calling_code = config.default_country_calling_code.trim_start_matches('+');
    if calling_code.is_empty()
        || calling_code.len() > 3
        || calling_code.starts_with('0')
        || !calling_code.chars().all(|c| c.is_ascii_digit())
    {
        return Err(DomainError::Validation {
            message: format!(
                "default_country_calling_code is not a calling code: {}",
                config.default_country_calling_code
            ),
        });
    }
    if config.captcha_anchor_id.trim().is_empty() {
        return Err(DomainError::Validation {
            message: "captcha_anchor_id must not be empty".to_string(),
        });
    }
    Ok(())
}

//! Mock implementations for testing the verification controller

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use pv_shared::config::VerificationPolicyConfig;

use crate::domain::value_objects::{ConfirmationHandle, VerifiedIdentity};
use crate::services::verification::{
    AnchorHost, ChallengeCallbacks, ChallengeWidget, Clock, OtpProvider, ProviderError,
    VerificationController, WidgetId,
};

pub const PHONE: &str = "(415) 555-2671";
pub const PHONE_E164: &str = "+14155552671";
pub const GOOD_CODE: &str = "123456";
pub const WRONG_CODE: &str = "654321";

// Mock OTP provider with scripted failures and an optional hold point
pub struct MockOtpProvider {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub confirmed: Arc<Mutex<Vec<String>>>,
    pub deleted: Arc<Mutex<Vec<String>>>,
    send_errors: Mutex<VecDeque<ProviderError>>,
    confirm_errors: Mutex<VecDeque<ProviderError>>,
    delete_should_fail: bool,
    hold: Mutex<bool>,
    entered: Notify,
    released: Notify,
}

impl MockOtpProvider {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            confirmed: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            send_errors: Mutex::new(VecDeque::new()),
            confirm_errors: Mutex::new(VecDeque::new()),
            delete_should_fail: false,
            hold: Mutex::new(false),
            entered: Notify::new(),
            released: Notify::new(),
        }
    }

    pub fn with_failing_delete() -> Self {
        Self {
            delete_should_fail: true,
            ..Self::new()
        }
    }

    pub fn fail_next_send(&self, code: &str) {
        self.send_errors
            .lock()
            .unwrap()
            .push_back(ProviderError::new(code, "scripted send failure"));
    }

    pub fn fail_next_confirm(&self, code: &str) {
        self.confirm_errors
            .lock()
            .unwrap()
            .push_back(ProviderError::new(code, "scripted confirm failure"));
    }

    /// Make the next provider calls wait for [`MockOtpProvider::release`]
    pub fn hold_calls(&self) {
        *self.hold.lock().unwrap() = true;
    }

    /// Wait until a held call has reached the provider
    pub async fn wait_until_called(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        *self.hold.lock().unwrap() = false;
        self.released.notify_one();
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn confirm_count(&self) -> usize {
        self.confirmed.lock().unwrap().len()
    }

    pub fn delete_count(&self) -> usize {
        self.deleted.lock().unwrap().len()
    }

    async fn pause_if_held(&self) {
        let held = *self.hold.lock().unwrap();
        if held {
            self.entered.notify_one();
            self.released.notified().await;
        }
    }
}

#[async_trait]
impl OtpProvider for MockOtpProvider {
    async fn send_verification_code(
        &self,
        phone_e164: &str,
        challenge_token: &str,
    ) -> Result<ConfirmationHandle, ProviderError> {
        self.pause_if_held().await;
        let mut sent = self.sent.lock().unwrap();
        sent.push((phone_e164.to_string(), challenge_token.to_string()));
        if let Some(error) = self.send_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(ConfirmationHandle::new(format!("session-{}", sent.len())))
    }

    async fn confirm_code(
        &self,
        handle: &ConfirmationHandle,
        code: &str,
    ) -> Result<VerifiedIdentity, ProviderError> {
        self.pause_if_held().await;
        self.confirmed.lock().unwrap().push(code.to_string());
        if let Some(error) = self.confirm_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        if code != GOOD_CODE {
            return Err(ProviderError::new(
                "auth/invalid-verification-code",
                "wrong code",
            ));
        }
        let phone_number = self
            .sent
            .lock()
            .unwrap()
            .last()
            .map(|(phone, _)| phone.clone())
            .unwrap_or_default();
        Ok(VerifiedIdentity {
            uid: format!("uid-{}", handle.as_str()),
            phone_number,
            id_token: "id-token".to_string(),
            is_new_user: true,
        })
    }

    async fn delete_identity(&self, identity: &VerifiedIdentity) -> Result<(), ProviderError> {
        self.deleted.lock().unwrap().push(identity.uid.clone());
        if self.delete_should_fail {
            return Err(ProviderError::new("auth/requires-recent-login", "cannot delete"));
        }
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

// Mock challenge widget that refuses to render twice into one anchor
pub struct MockWidget {
    pub renders: Mutex<u32>,
    pub executes: Mutex<u32>,
    pub resets: Mutex<u32>,
    pub clears: Mutex<u32>,
    rendered_anchors: Mutex<HashSet<String>>,
    callbacks: Mutex<Option<ChallengeCallbacks>>,
    pub render_should_fail: bool,
    pub execute_should_fail: bool,
}

impl MockWidget {
    pub fn new() -> Self {
        Self {
            renders: Mutex::new(0),
            executes: Mutex::new(0),
            resets: Mutex::new(0),
            clears: Mutex::new(0),
            rendered_anchors: Mutex::new(HashSet::new()),
            callbacks: Mutex::new(None),
            render_should_fail: false,
            execute_should_fail: false,
        }
    }

    /// Widget whose script never loads
    pub fn failing_render() -> Self {
        Self {
            render_should_fail: true,
            ..Self::new()
        }
    }

    /// Widget whose challenge is always abandoned
    pub fn failing_execute() -> Self {
        Self {
            execute_should_fail: true,
            ..Self::new()
        }
    }

    pub fn render_count(&self) -> u32 {
        *self.renders.lock().unwrap()
    }

    pub fn reset_count(&self) -> u32 {
        *self.resets.lock().unwrap()
    }

    pub fn clear_count(&self) -> u32 {
        *self.clears.lock().unwrap()
    }

    /// Callbacks wired by the most recent render, while it is live
    pub fn current_callbacks(&self) -> Option<ChallengeCallbacks> {
        self.callbacks.lock().unwrap().clone()
    }

    /// Fire the expired callback of the most recent render
    pub fn expire_token(&self) {
        if let Some(callbacks) = self.current_callbacks() {
            callbacks.expired();
        }
    }
}

#[async_trait]
impl ChallengeWidget for MockWidget {
    fn render(&self, anchor_id: &str, callbacks: ChallengeCallbacks) -> Result<WidgetId, String> {
        if self.render_should_fail {
            return Err("widget script failed to load".to_string());
        }
        let mut anchors = self.rendered_anchors.lock().unwrap();
        if !anchors.insert(anchor_id.to_string()) {
            return Err("reCAPTCHA has already been rendered in this element".to_string());
        }
        let mut renders = self.renders.lock().unwrap();
        *renders += 1;
        *self.callbacks.lock().unwrap() = Some(callbacks);
        Ok(WidgetId(u64::from(*renders)))
    }

    async fn execute(&self, widget: WidgetId) -> Result<String, String> {
        *self.executes.lock().unwrap() += 1;
        if self.execute_should_fail {
            return Err("challenge closed".to_string());
        }
        let callbacks = self.callbacks.lock().unwrap().clone();
        let token = format!("token-{}", widget.0);
        if let Some(callbacks) = callbacks {
            callbacks.solved(&token);
        }
        Ok(token)
    }

    fn reset(&self, _widget: WidgetId) {
        *self.resets.lock().unwrap() += 1;
    }

    fn clear(&self, _widget: WidgetId) {
        *self.clears.lock().unwrap() += 1;
        self.rendered_anchors.lock().unwrap().clear();
        *self.callbacks.lock().unwrap() = None;
    }
}

// Mock page holding anchor elements
pub struct MockAnchorHost {
    pub anchors: Mutex<HashSet<String>>,
    pub created: Mutex<u32>,
    pub removed: Mutex<u32>,
}

impl MockAnchorHost {
    pub fn new() -> Self {
        Self {
            anchors: Mutex::new(HashSet::new()),
            created: Mutex::new(0),
            removed: Mutex::new(0),
        }
    }

    pub fn with_anchor(anchor_id: &str) -> Self {
        let host = Self::new();
        host.anchors.lock().unwrap().insert(anchor_id.to_string());
        host
    }

    pub fn has_anchor(&self, anchor_id: &str) -> bool {
        self.anchors.lock().unwrap().contains(anchor_id)
    }
}

impl AnchorHost for MockAnchorHost {
    fn contains(&self, anchor_id: &str) -> bool {
        self.has_anchor(anchor_id)
    }

    fn create(&self, anchor_id: &str) -> Result<(), String> {
        *self.created.lock().unwrap() += 1;
        self.anchors.lock().unwrap().insert(anchor_id.to_string());
        Ok(())
    }

    fn remove(&self, anchor_id: &str) {
        *self.removed.lock().unwrap() += 1;
        self.anchors.lock().unwrap().remove(anchor_id);
    }
}

// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    pub fn advance_secs(&self, seconds: i64) {
        *self.now.lock().unwrap() += Duration::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct Harness {
    pub controller: Arc<VerificationController>,
    pub provider: Arc<MockOtpProvider>,
    pub widget: Arc<MockWidget>,
    pub host: Arc<MockAnchorHost>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_parts(
            VerificationPolicyConfig::default(),
            MockOtpProvider::new(),
            MockWidget::new(),
        )
    }

    pub fn with_parts(
        config: VerificationPolicyConfig,
        provider: MockOtpProvider,
        widget: MockWidget,
    ) -> Self {
        let provider = Arc::new(provider);
        let widget = Arc::new(widget);
        let host = Arc::new(MockAnchorHost::new());
        let clock = Arc::new(ManualClock::new());
        let controller = VerificationController::with_clock(
            config,
            provider.clone(),
            widget.clone(),
            host.clone(),
            clock.clone(),
        )
        .unwrap();

        Self {
            controller: Arc::new(controller),
            provider,
            widget,
            host,
            clock,
        }
    }

    /// Send the first code and assert it was issued
    pub async fn code_sent(&self) {
        let outcome = self.controller.send_verification_code(PHONE).await;
        assert!(outcome.success, "first send failed: {:?}", outcome);
    }
}

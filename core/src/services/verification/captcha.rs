//! Ownership of the invisible human-verification widget
//!
//! The widget cannot be rendered twice into the same anchor, so the provider
//! creates it lazily once, hands out the same handle for every send of a
//! session, and disposes it exactly once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::VerificationErrorKind;

use super::traits::{AnchorHost, ChallengeWidget};
use super::types::{ChallengeCallbacks, WidgetId};

/// Handle to the live widget of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeHandle {
    widget_id: WidgetId,
    anchor_id: String,
}

impl ChallengeHandle {
    pub fn widget_id(&self) -> WidgetId {
        self.widget_id
    }

    pub fn anchor_id(&self) -> &str {
        &self.anchor_id
    }
}

struct LiveChallenge {
    handle: ChallengeHandle,
    /// The anchor did not exist before and is removed on dispose
    created_anchor: bool,
}

/// Lazily creates, reuses and disposes the challenge widget
pub struct CaptchaChallengeProvider {
    widget: Arc<dyn ChallengeWidget>,
    host: Arc<dyn AnchorHost>,
    live: Mutex<Option<LiveChallenge>>,
}

impl CaptchaChallengeProvider {
    pub fn new(widget: Arc<dyn ChallengeWidget>, host: Arc<dyn AnchorHost>) -> Self {
        Self {
            widget,
            host,
            live: Mutex::new(None),
        }
    }

    fn live(&self) -> MutexGuard<'_, Option<LiveChallenge>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the live handle, rendering the widget on first use
    ///
    /// `callbacks` are only wired when the widget is rendered; later calls
    /// reuse the existing widget and its original callbacks.
    pub fn get_or_create(
        &self,
        anchor_id: &str,
        callbacks: ChallengeCallbacks,
    ) -> Result<ChallengeHandle, VerificationErrorKind> {
        let mut live = self.live();
        if let Some(existing) = live.as_ref() {
            if existing.handle.anchor_id != anchor_id {
                tracing::warn!(
                    live_anchor = %existing.handle.anchor_id,
                    requested_anchor = %anchor_id,
                    event = "captcha_anchor_mismatch",
                    "Challenge widget already live on another anchor, reusing it"
                );
            }
            return Ok(existing.handle.clone());
        }

        let created_anchor = if self.host.contains(anchor_id) {
            false
        } else {
            self.host.create(anchor_id).map_err(|e| {
                tracing::error!(
                    anchor = %anchor_id,
                    error = %e,
                    event = "captcha_anchor_create_failed",
                    "Failed to create challenge anchor"
                );
                VerificationErrorKind::CaptchaFailed
            })?;
            true
        };

        let widget_id = match self.widget.render(anchor_id, callbacks) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(
                    anchor = %anchor_id,
                    error = %e,
                    event = "captcha_render_failed",
                    "Failed to render challenge widget"
                );
                if created_anchor {
                    self.host.remove(anchor_id);
                }
                return Err(VerificationErrorKind::CaptchaFailed);
            }
        };

        tracing::debug!(
            anchor = %anchor_id,
            widget = widget_id.0,
            created_anchor = created_anchor,
            event = "captcha_rendered",
            "Rendered challenge widget"
        );

        let handle = ChallengeHandle {
            widget_id,
            anchor_id: anchor_id.to_string(),
        };
        *live = Some(LiveChallenge {
            handle: handle.clone(),
            created_anchor,
        });
        Ok(handle)
    }

    /// Run the challenge and obtain a fresh token
    pub async fn token(&self, handle: &ChallengeHandle) -> Result<String, VerificationErrorKind> {
        self.widget.execute(handle.widget_id).await.map_err(|e| {
            tracing::warn!(
                widget = handle.widget_id.0,
                error = %e,
                event = "captcha_execute_failed",
                "Challenge widget did not produce a token"
            );
            VerificationErrorKind::CaptchaFailed
        })
    }

    /// Re-arm the live widget after the provider rejected its token
    pub fn reset_widget(&self) {
        if let Some(live) = self.live().as_ref() {
            self.widget.reset(live.handle.widget_id);
        }
    }

    pub fn is_live(&self) -> bool {
        self.live().is_some()
    }

    /// Clear the widget and remove the anchor if this provider created it
    ///
    /// Safe to call repeatedly; only the first call after a render acts.
    pub fn dispose(&self) {
        let Some(live) = self.live().take() else {
            return;
        };
        self.widget.clear(live.handle.widget_id);
        if live.created_anchor {
            self.host.remove(&live.handle.anchor_id);
        }
        tracing::debug!(
            anchor = %live.handle.anchor_id,
            widget = live.handle.widget_id.0,
            removed_anchor = live.created_anchor,
            event = "captcha_disposed",
            "Disposed challenge widget"
        );
    }
}

impl Drop for CaptchaChallengeProvider {
    fn drop(&mut self) {
        self.dispose();
    }
}

//! Headless challenge widget returning a preset token

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use pv_core::services::verification::{ChallengeCallbacks, ChallengeWidget, WidgetId};

struct RenderedWidget {
    anchor_id: String,
    callbacks: ChallengeCallbacks,
}

/// Challenge widget that solves every challenge with a fixed token
///
/// Auth emulators accept any challenge token, so this widget lets the full
/// flow run without a browser. Like the real widget it refuses a second
/// render into an anchor that already holds one.
pub struct PresetTokenWidget {
    token: String,
    next_id: AtomicU64,
    rendered: Mutex<HashMap<WidgetId, RenderedWidget>>,
}

impl PresetTokenWidget {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            next_id: AtomicU64::new(1),
            rendered: Mutex::new(HashMap::new()),
        }
    }

    fn rendered(&self) -> MutexGuard<'_, HashMap<WidgetId, RenderedWidget>> {
        self.rendered.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of widgets currently rendered
    pub fn live_count(&self) -> usize {
        self.rendered().len()
    }

    /// Simulate the token of a widget expiring before it was used
    pub fn expire(&self, widget: WidgetId) {
        let callbacks = self.rendered().get(&widget).map(|w| w.callbacks.clone());
        if let Some(callbacks) = callbacks {
            callbacks.expired();
        }
    }
}

impl Default for PresetTokenWidget {
    fn default() -> Self {
        Self::new("preset-challenge-token")
    }
}

#[async_trait]
impl ChallengeWidget for PresetTokenWidget {
    fn render(&self, anchor_id: &str, callbacks: ChallengeCallbacks) -> Result<WidgetId, String> {
        let mut rendered = self.rendered();
        if rendered.values().any(|w| w.anchor_id == anchor_id) {
            return Err(format!(
                "Challenge widget has already been rendered in element '{}'",
                anchor_id
            ));
        }
        let id = WidgetId(self.next_id.fetch_add(1, Ordering::SeqCst));
        rendered.insert(
            id,
            RenderedWidget {
                anchor_id: anchor_id.to_string(),
                callbacks,
            },
        );
        Ok(id)
    }

    async fn execute(&self, widget: WidgetId) -> Result<String, String> {
        let callbacks = self
            .rendered()
            .get(&widget)
            .map(|w| w.callbacks.clone())
            .ok_or_else(|| format!("Widget {} is not rendered", widget.0))?;
        callbacks.solved(&self.token);
        Ok(self.token.clone())
    }

    fn reset(&self, widget: WidgetId) {
        tracing::debug!(widget = widget.0, "Preset challenge widget reset");
    }

    fn clear(&self, widget: WidgetId) {
        self.rendered().remove(&widget);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_execute_clear() {
        let widget = PresetTokenWidget::new("tok");

        let id = widget
            .render("recaptcha-container", ChallengeCallbacks::noop())
            .unwrap();
        assert!(widget
            .render("recaptcha-container", ChallengeCallbacks::noop())
            .is_err());
        assert_eq!(widget.execute(id).await.unwrap(), "tok");

        widget.clear(id);
        assert_eq!(widget.live_count(), 0);
        assert!(widget.execute(id).await.is_err());
        assert!(widget
            .render("recaptcha-container", ChallengeCallbacks::noop())
            .is_ok());
    }
}

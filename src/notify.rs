//! Notification dispatch
//!
//! Every outbound message funnels through the [`Notifier`]: formatted
//! sends carry the application identity and rich-text rendering, raw
//! sends deliver text verbatim. The dispatcher owns the enable switch
//! and the debug-identity suppression rule, and serializes calls onto
//! the shared session.

use crate::error::{Error, Result};
use crate::session::Session;
use crate::telegram::PARSE_MODE_MARKDOWN;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Identity substring that marks a debug deployment. A debug instance
/// must not post formatted notifications as the real service; raw sends
/// stay available so command replies keep working.
const DEBUG_MARKER: &str = "___";

/// Notification dispatcher
pub struct Notifier {
    /// `None` when the delivery channel is disabled.
    session: Option<Arc<Session>>,
    app_name: String,
    /// Serializes outbound calls so HTTP-path and command-loop sends
    /// cannot interleave on the shared session.
    send_lock: Mutex<()>,
}

impl Notifier {
    /// Dispatcher bound to an active session.
    pub fn new(session: Arc<Session>, app_name: impl Into<String>) -> Self {
        Self {
            session: Some(session),
            app_name: app_name.into(),
            send_lock: Mutex::new(()),
        }
    }

    /// Dispatcher with the delivery channel switched off. Every send is a
    /// silent no-op returning success.
    pub fn disabled() -> Self {
        Self {
            session: None,
            app_name: String::new(),
            send_lock: Mutex::new(()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.session.is_some()
    }

    fn is_debug_identity(&self) -> bool {
        self.app_name.contains(DEBUG_MARKER)
    }

    /// Formatted send: `*<identity>:* <text>` with Markdown rendering.
    pub async fn send(&self, text: &str) -> Result<()> {
        self.send_formatted(text, None).await
    }

    /// Formatted send with a single clickable button labeled with the
    /// link's host. A link that does not parse is a delivery error.
    pub async fn send_with_link(&self, text: &str, link: &str) -> Result<()> {
        self.send_formatted(text, Some(link)).await
    }

    /// Raw send: text verbatim, no identity prefix, no rich text, no
    /// button. Never suppressed by the debug-identity rule.
    pub async fn send_raw(&self, text: &str) -> Result<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };

        let _guard = self.send_lock.lock().await;
        session
            .client()
            .send_message(session.chat_id(), text, None, None)
            .await
    }

    async fn send_formatted(&self, text: &str, link: Option<&str>) -> Result<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        if self.is_debug_identity() {
            return Err(Error::DebugSuppressed);
        }

        let reply_markup = match link {
            Some(link) => Some(link_button(link)?),
            None => None,
        };
        let text = format!("*{}:* {}", self.app_name, text);

        let _guard = self.send_lock.lock().await;
        session
            .client()
            .send_message(
                session.chat_id(),
                &text,
                Some(PARSE_MODE_MARKDOWN),
                reply_markup,
            )
            .await
    }
}

/// Single-row inline keyboard with one URL button labeled by the host.
fn link_button(link: &str) -> Result<serde_json::Value> {
    let url = reqwest::Url::parse(link).map_err(|e| Error::InvalidLink {
        link: link.to_string(),
        reason: e.to_string(),
    })?;
    let label = url.host_str().ok_or_else(|| Error::InvalidLink {
        link: link.to_string(),
        reason: "link has no host".to_string(),
    })?;

    Ok(serde_json::json!({
        "inline_keyboard": [[{ "text": label, "url": link }]]
    }))
}

//! Minimal Telegram Bot API client
//!
//! Speaks the HTTP Bot API directly: JSON method calls, the
//! `ok`/`result`/`description` response envelope, and long polling via
//! `getUpdates`.
//!
//! API Reference: https://core.telegram.org/bots/api

use crate::error::{Error, Result};
use serde_json::Value;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Markdown parse mode used for formatted sends.
pub const PARSE_MODE_MARKDOWN: &str = "Markdown";

/// Telegram Bot API client
pub struct TelegramClient {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl TelegramClient {
    /// Client against the production Bot API.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base(token, TELEGRAM_API_BASE)
    }

    /// Client against a non-default API base. Tests point this at a local
    /// fake server.
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            api_base: api_base.into(),
        }
    }

    /// Build the URL for a Bot API method.
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Call a Bot API method and unwrap the response envelope.
    async fn api_call(&self, method: &str, body: &Value) -> Result<Value> {
        let url = self.api_url(method);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Delivery(format!("Telegram API request failed: {}", e)))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| Error::Delivery(format!("Failed to parse Telegram response: {}", e)))?;

        if !status.is_success() || body.get("ok") != Some(&Value::Bool(true)) {
            let description = body["description"].as_str().unwrap_or("unknown error");
            return Err(Error::Delivery(format!(
                "Telegram API error ({}): {}",
                status, description
            )));
        }

        Ok(body["result"].clone())
    }

    /// Verify the token with `getMe`. Returns the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self.api_call("getMe", &serde_json::json!({})).await?;
        Ok(me["username"].as_str().unwrap_or("unknown").to_string())
    }

    /// Send a message to a conversation.
    ///
    /// `parse_mode` switches on rich-text rendering; `reply_markup`
    /// attaches an inline keyboard. Both are omitted from the request
    /// when `None`.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
        reply_markup: Option<Value>,
    ) -> Result<()> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        if let Some(mode) = parse_mode {
            body["parse_mode"] = Value::String(mode.to_string());
        }
        if let Some(markup) = reply_markup {
            body["reply_markup"] = markup;
        }

        self.api_call("sendMessage", &body).await?;
        Ok(())
    }

    /// Fetch pending updates starting at `offset`.
    ///
    /// `timeout` is the server-side long-poll window in seconds; zero
    /// returns immediately.
    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Value>> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout,
            "allowed_updates": ["message"],
        });

        let result = self.api_call("getUpdates", &body).await?;
        Ok(result.as_array().cloned().unwrap_or_default())
    }
}

/// Text payload of an update, if it has one.
pub fn update_text(update: &Value) -> Option<&str> {
    update.get("message")?.get("text")?.as_str()
}

/// Sequence number used to advance the long-poll offset.
pub fn update_id(update: &Value) -> Option<i64> {
    update.get("update_id")?.as_i64()
}

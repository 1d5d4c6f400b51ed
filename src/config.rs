//! Gateway configuration management
//!
//! Assembled once at startup from CLI flags and environment variables,
//! then passed by reference to every component that needs it. Nothing in
//! here is mutated after startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Telegram delivery channel configuration
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub listen_addr: String,

    /// Directory with the public form assets, served at `/`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            static_dir: PathBuf::from("public"),
        }
    }
}

/// Telegram delivery channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Master switch for the delivery channel. When off, every send is a
    /// silent no-op and no session is opened.
    pub enabled: bool,

    /// Bot token for the Telegram Bot API
    pub bot_token: String,

    /// Conversation that receives notifications and commands
    pub chat_id: i64,

    /// Name the service announces itself as in formatted messages
    pub app_name: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: String::new(),
            chat_id: 0,
            app_name: "Wedding".to_string(),
        }
    }
}

impl Config {
    /// Log every resolved configuration value at startup. The bot token is
    /// a secret and is always logged as `"hidden"`.
    pub fn log_startup(&self) {
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            listen_addr = %self.server.listen_addr,
            static_dir = %self.server.static_dir.display(),
            telegram_enabled = self.telegram.enabled,
            telegram_bot_token = "hidden",
            telegram_chat_id = self.telegram.chat_id,
            app_name = %self.telegram.app_name,
            "Resolved configuration"
        );
    }
}

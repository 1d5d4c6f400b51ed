//! RSVP gateway binary

use anyhow::Result;
use clap::Parser;
use rsvp_gateway::config::{Config, ServerConfig, TelegramConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rsvp-gateway")]
#[command(version)]
#[command(about = "RSVP intake gateway with Telegram notifications")]
struct Cli {
    /// HTTP listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "RSVP_LISTEN_ADDR")]
    listen_addr: String,

    /// Directory with the public form assets, served at `/`
    #[arg(long, default_value = "public", env = "RSVP_STATIC_DIR")]
    static_dir: PathBuf,

    /// Enable the Telegram delivery channel
    #[arg(long, env = "RSVP_TELEGRAM_ENABLED")]
    telegram_enabled: bool,

    /// Telegram bot token
    #[arg(long, default_value = "", env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    telegram_token: String,

    /// Telegram conversation that receives notifications
    #[arg(long, default_value_t = 0, env = "TELEGRAM_CHAT_ID")]
    telegram_chat_id: i64,

    /// Name the service announces itself as in formatted messages
    #[arg(long, default_value = "Wedding", env = "RSVP_APP_NAME")]
    app_name: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            server: ServerConfig {
                listen_addr: self.listen_addr,
                static_dir: self.static_dir,
            },
            telegram: TelegramConfig {
                enabled: self.telegram_enabled,
                bot_token: self.telegram_token,
                chat_id: self.telegram_chat_id,
                app_name: self.app_name,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rsvp_gateway={},tower_http=info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.into_config();
    config.log_startup();

    rsvp_gateway::bootstrap::run(config).await
}

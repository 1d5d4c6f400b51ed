//! Startup sequence
//!
//! Connects the Telegram session, spawns the command loop, and serves
//! HTTP until Ctrl-C. Session failures — a bad token at startup or the
//! update stream closing later — are fatal: the service does not run
//! without its outbound channel.

use crate::config::Config;
use crate::notify::Notifier;
use crate::server;
use crate::session::{self, Session};
use crate::telegram::TelegramClient;
use anyhow::{Context, Result};
use std::future::IntoFuture;
use std::sync::Arc;

/// Build the notification dispatcher from configuration.
///
/// With the channel disabled this returns a no-op dispatcher and no
/// session. Otherwise the session is connected and verified first.
pub async fn init_notifier(config: &Config) -> Result<(Arc<Notifier>, Option<Arc<Session>>)> {
    if !config.telegram.enabled {
        tracing::info!("Telegram is not enabled");
        return Ok((Arc::new(Notifier::disabled()), None));
    }
    if config.telegram.bot_token.is_empty() {
        anyhow::bail!("Telegram is enabled but no bot token is configured");
    }

    let client = TelegramClient::new(&config.telegram.bot_token);
    let session = Session::connect(client, config.telegram.chat_id)
        .await
        .context("Failed to initialize Telegram session")?;
    let notifier = Arc::new(Notifier::new(session.clone(), &config.telegram.app_name));

    Ok((notifier, Some(session)))
}

/// Run the gateway until Ctrl-C or a fatal session error.
pub async fn run(config: Config) -> Result<()> {
    let (notifier, session) = init_notifier(&config).await?;

    if let Err(e) = notifier.send("Starting application").await {
        tracing::warn!("Failed to send startup notification: {}", e);
    }

    // The command loop is the sole reader of the update stream. Stream
    // creation failure or closure crashes the process rather than
    // leaving the session half-alive.
    let command_loop = session.map(|session| {
        let notifier = notifier.clone();
        tokio::spawn(session::run_command_loop(session, notifier))
    });

    let app = server::build_app(notifier, &config.server.static_dir);
    let addr = &config.server.listen_addr;
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "RSVP gateway listening");

    let serve = axum::serve(listener, app).with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
    });

    match command_loop {
        Some(mut handle) => {
            tokio::select! {
                result = serve.into_future() => result.context("HTTP server error")?,
                result = &mut handle => {
                    return Err(match result {
                        Ok(Err(e)) => anyhow::Error::from(e).context("Fatal session error"),
                        Ok(Ok(())) => anyhow::anyhow!("Telegram command loop exited"),
                        Err(e) => anyhow::anyhow!("Telegram command loop panicked: {}", e),
                    });
                }
            }
        }
        None => serve.await.context("HTTP server error")?,
    }

    Ok(())
}

//! Telegram session lifecycle and the inbound command loop
//!
//! The session owns the Bot API client and the target conversation. Its
//! inbound update stream is created at most once per process through an
//! async once-gate; a single background task long-polls the Bot API and
//! feeds the stream, and a single consumer loop answers commands.

use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::telegram::{self, TelegramClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, OnceCell};

/// Seconds a `getUpdates` call blocks server-side waiting for events.
const POLL_TIMEOUT_SECS: u64 = 25;

/// Pause before polling again after a transport error.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Buffered inbound updates before the poll task backpressures.
const UPDATE_CHANNEL_CAPACITY: usize = 32;

/// Shared handle to the inbound update stream.
///
/// The mutex enforces the single-consumer rule: whoever holds it is the
/// only reader. The stream itself is created at most once per process.
pub type UpdateStream = Arc<Mutex<mpsc::Receiver<serde_json::Value>>>;

/// Telegram session: client handle, target conversation, and the
/// lazily-created inbound update stream.
pub struct Session {
    client: TelegramClient,
    chat_id: i64,
    /// Once-gate for stream creation. Caches the stream handle on
    /// success or the creation error for every later caller.
    updates: OnceCell<std::result::Result<UpdateStream, String>>,
}

impl Session {
    /// Open the session: verify the token with `getMe` before anything
    /// else uses the client. A rejected token is unrecoverable here and
    /// the caller treats it as fatal.
    pub async fn connect(client: TelegramClient, chat_id: i64) -> Result<Arc<Self>> {
        let bot = client
            .get_me()
            .await
            .map_err(|e| Error::Session(format!("Failed to verify bot token: {}", e)))?;
        tracing::info!(bot = %bot, "Telegram bot authenticated");

        Ok(Arc::new(Self {
            client,
            chat_id,
            updates: OnceCell::new(),
        }))
    }

    pub fn client(&self) -> &TelegramClient {
        &self.client
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// Open the inbound update stream, creating it on first call.
    ///
    /// Concurrent first callers race into the same gate and all observe
    /// the same outcome; a creation failure is remembered and returned to
    /// every caller from then on.
    pub async fn update_stream(self: &Arc<Self>) -> Result<UpdateStream> {
        let outcome = self
            .updates
            .get_or_init(|| async {
                self.open_stream().await.map_err(|e| e.to_string())
            })
            .await;

        match outcome {
            Ok(stream) => Ok(stream.clone()),
            Err(e) => Err(Error::Session(e.clone())),
        }
    }

    /// Probe the Bot API once with a zero timeout, then hand the
    /// long-poll task its starting offset. A bad session fails here, not
    /// silently inside the background task.
    async fn open_stream(self: &Arc<Self>) -> Result<UpdateStream> {
        let initial = self
            .client
            .get_updates(0, 0)
            .await
            .map_err(|e| Error::Session(format!("Failed to open update stream: {}", e)))?;

        let offset = initial
            .iter()
            .filter_map(telegram::update_id)
            .max()
            .map(|id| id + 1)
            .unwrap_or(0);

        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let session = self.clone();
        tokio::spawn(async move {
            // Anything the probe already pulled goes to the consumer first.
            for update in initial {
                if tx.send(update).await.is_err() {
                    return;
                }
            }
            session.poll_loop(tx, offset).await;
        });

        Ok(Arc::new(Mutex::new(rx)))
    }

    /// Long-poll task: the sole producer for the update stream. Runs
    /// until the consumer goes away.
    async fn poll_loop(&self, tx: mpsc::Sender<serde_json::Value>, mut offset: i64) {
        tracing::info!("Telegram long polling started");

        loop {
            match self.client.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => {
                    for update in updates {
                        if let Some(id) = telegram::update_id(&update) {
                            offset = id + 1;
                        }
                        if tx.send(update).await.is_err() {
                            tracing::warn!("Update stream closed, stopping poll loop");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Telegram poll error: {}, retrying in 5s", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }
}

/// Consume the inbound stream and answer known commands.
///
/// Replies go through the raw dispatcher path so they keep working when
/// the service runs under a debug identity. Updates without a text
/// payload and unrecognized text are ignored. The loop only returns when
/// the stream closes, which the caller escalates as fatal.
pub async fn run_command_loop(session: Arc<Session>, notifier: Arc<Notifier>) -> Result<()> {
    let stream = session.update_stream().await?;
    let mut rx = stream.lock().await;

    while let Some(update) = rx.recv().await {
        let Some(text) = telegram::update_text(&update) else {
            continue;
        };

        match text {
            "ping" => {
                if let Err(e) = notifier.send_raw("pong").await {
                    tracing::warn!("Failed to answer ping: {}", e);
                }
            }
            _ => {}
        }
    }

    Err(Error::Session("Telegram update stream closed".to_string()))
}

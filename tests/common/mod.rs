//! Shared fake Telegram Bot API server for integration tests.
//!
//! Records every Bot API call and serves canned responses, so tests can
//! assert exactly how many external calls a code path performed and what
//! they carried.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// One recorded Bot API call.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub method: String,
    pub body: Value,
}

/// In-process stand-in for the Bot API.
#[derive(Clone, Default)]
pub struct FakeBotApi {
    calls: Arc<Mutex<Vec<ApiCall>>>,
    pending_updates: Arc<Mutex<Vec<Value>>>,
    get_updates_fails: Arc<AtomicBool>,
}

impl FakeBotApi {
    /// Queue updates to be handed out by the next `getUpdates` call.
    pub fn push_updates(&self, updates: Vec<Value>) {
        self.pending_updates.lock().unwrap().extend(updates);
    }

    /// Make every `getUpdates` call fail with an API error.
    pub fn fail_get_updates(&self) {
        self.get_updates_fails.store(true, Ordering::SeqCst);
    }

    /// Recorded calls for one API method.
    pub fn calls_for(&self, method: &str) -> Vec<ApiCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Bind the fake server on a free port and return its base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/:token/:method", post(handle))
            .with_state(self.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

async fn handle(
    State(api): State<FakeBotApi>,
    Path((_token, method)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Json<Value> {
    api.calls.lock().unwrap().push(ApiCall {
        method: method.clone(),
        body: body.clone(),
    });

    match method.as_str() {
        "getMe" => Json(json!({
            "ok": true,
            "result": { "id": 42, "is_bot": true, "username": "rsvp_test_bot" }
        })),
        "sendMessage" => Json(json!({ "ok": true, "result": { "message_id": 1 } })),
        "getUpdates" => {
            if api.get_updates_fails.load(Ordering::SeqCst) {
                return Json(json!({ "ok": false, "description": "Unauthorized" }));
            }
            let updates: Vec<Value> = {
                let mut pending = api.pending_updates.lock().unwrap();
                pending.drain(..).collect()
            };
            if updates.is_empty() {
                // Behave like a long poll so the background task does not spin.
                let timeout = body["timeout"].as_u64().unwrap_or(0);
                tokio::time::sleep(Duration::from_secs(timeout.min(5))).await;
            }
            Json(json!({ "ok": true, "result": updates }))
        }
        _ => Json(json!({ "ok": true, "result": {} })),
    }
}

//! HTTP intake integration tests
//!
//! End-to-end over a real listener: form submission in, redirect out,
//! and the exact notification call observed at the fake Bot API.

mod common;

use common::FakeBotApi;
use rsvp_gateway::server::build_app;
use rsvp_gateway::session::Session;
use rsvp_gateway::{Notifier, TelegramClient};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn_app(notifier: Arc<Notifier>, static_dir: &Path) -> String {
    let app = build_app(notifier, static_dir);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn enabled_notifier(api: &FakeBotApi, app_name: &str) -> Arc<Notifier> {
    let base = api.spawn().await;
    let client = TelegramClient::with_api_base("test-token", base);
    let session = Session::connect(client, 77).await.unwrap();
    Arc::new(Notifier::new(session, app_name))
}

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_valid_submission_redirects_and_notifies() {
    let api = FakeBotApi::default();
    let notifier = enabled_notifier(&api, "Wedding").await;
    let tmp = tempfile::tempdir().unwrap();
    let base = spawn_app(notifier, tmp.path()).await;

    let resp = no_redirect_client()
        .put(format!("{}/user_account/attendance", base))
        .json(&json!({
            "name": "Olena",
            "attendance": "1",
            "accommodation": "2",
            "comment": "see you there"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/?ok=1");

    let sends = api.calls_for("sendMessage");
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].body["chat_id"], 77);
    assert_eq!(
        sends[0].body["text"],
        "*Wedding:* \n*Імʼя:*\nOlena\n*Присутність:*\nТак, зможу\n*Проживання:*\nНе знаю, мені потрібна допомога\n*Коментарі:*\nsee you there\n"
    );
    assert_eq!(sends[0].body["parse_mode"], "Markdown");
}

#[tokio::test]
async fn test_unknown_option_code_is_a_client_error() {
    let api = FakeBotApi::default();
    let notifier = enabled_notifier(&api, "Wedding").await;
    let tmp = tempfile::tempdir().unwrap();
    let base = spawn_app(notifier, tmp.path()).await;

    let resp = no_redirect_client()
        .put(format!("{}/user_account/attendance", base))
        .json(&json!({
            "name": "Olena",
            "attendance": "9",
            "accommodation": "2",
            "comment": ""
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(api.calls_for("sendMessage").is_empty());
}

#[tokio::test]
async fn test_intake_method_is_restricted() {
    let tmp = tempfile::tempdir().unwrap();
    let base = spawn_app(Arc::new(Notifier::disabled()), tmp.path()).await;

    let resp = no_redirect_client()
        .post(format!("{}/user_account/attendance", base))
        .json(&json!({ "name": "x", "attendance": "1", "accommodation": "1", "comment": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_delivery_failure_does_not_break_acceptance() {
    // Debug identity makes the formatted send fail; the submitter still
    // gets the success redirect.
    let api = FakeBotApi::default();
    let notifier = enabled_notifier(&api, "Wedding___staging").await;
    let tmp = tempfile::tempdir().unwrap();
    let base = spawn_app(notifier, tmp.path()).await;

    let resp = no_redirect_client()
        .put(format!("{}/user_account/attendance", base))
        .json(&json!({
            "name": "Olena",
            "attendance": "1",
            "accommodation": "1",
            "comment": ""
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
    assert!(api.calls_for("sendMessage").is_empty());
}

#[tokio::test]
async fn test_disabled_channel_still_accepts_submissions() {
    let tmp = tempfile::tempdir().unwrap();
    let base = spawn_app(Arc::new(Notifier::disabled()), tmp.path()).await;

    let resp = no_redirect_client()
        .put(format!("{}/user_account/attendance", base))
        .json(&json!({
            "name": "Olena",
            "attendance": "2",
            "accommodation": "3",
            "comment": "maybe"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_serves_static_form_assets() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("index.html"), "<html>RSVP form</html>").unwrap();
    let base = spawn_app(Arc::new(Notifier::disabled()), tmp.path()).await;

    let resp = reqwest::get(format!("{}/", base)).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("RSVP form"));
}

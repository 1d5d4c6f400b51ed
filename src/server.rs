//! HTTP surface: attendance intake and static form assets

use crate::intake::{AttendanceRecord, AttendanceSubmission};
use crate::notify::Notifier;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::put,
    Json, Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub notifier: Arc<Notifier>,
}

/// Build the HTTP application: the attendance intake route plus the
/// public form assets served at `/`.
pub fn build_app(notifier: Arc<Notifier>, static_dir: &Path) -> Router {
    Router::new()
        .route("/user_account/attendance", put(submit_attendance))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { notifier })
}

/// Accept an attendance submission.
///
/// Validation failure is the submitter's fault and yields a 400. A
/// failed notification send is logged and does not break form
/// acceptance; the browser still gets the 303 redirect back to the
/// form page.
async fn submit_attendance(
    State(state): State<AppState>,
    Json(submission): Json<AttendanceSubmission>,
) -> Response {
    tracing::info!(
        name = %submission.name,
        attendance = %submission.attendance,
        accommodation = %submission.accommodation,
        comment = %submission.comment,
        "Form submit"
    );

    let record = match AttendanceRecord::from_submission(submission) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Rejected submission: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    if let Err(e) = state.notifier.send(&record.to_string()).await {
        tracing::warn!("Failed to deliver attendance notification: {}", e);
    }

    Redirect::to("/?ok=1").into_response()
}

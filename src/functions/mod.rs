//! The two serverless-style endpoints under `/functions/v1`.
//!
//! These keep the flat `{ "success": false, "error": ... }` failure shape
//! the marketing site expects instead of the dashboard notification body.

pub mod meeting;
pub mod verify_email;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;

use crate::error::DatabaseError;
use crate::server::AppState;

pub use meeting::{MeetingData, record_meeting_request};
pub use verify_email::{EmailReport, verify_email_exists};

/// Failure returned by a function endpoint.
#[derive(Debug)]
pub struct FunctionError {
    pub status: StatusCode,
    pub error: String,
}

impl FunctionError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: "Not found".into(),
        }
    }
}

impl From<DatabaseError> for FunctionError {
    fn from(err: DatabaseError) -> Self {
        tracing::error!(error = %err, "Store error in function");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Something went wrong".into(),
        }
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "success": false, "error": self.error })),
        )
            .into_response()
    }
}

/// Build the `/functions/v1` routes.
pub fn function_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/functions/v1/send-meeting-notification",
            post(meeting::send_meeting_notification),
        )
        .route(
            "/functions/v1/verify-email-exists",
            post(verify_email::handler),
        )
        .with_state(state)
}

//! Demo/meeting request intake.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::server::AppState;
use crate::store::{Database, MeetingRequest};

use super::FunctionError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingData {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingBody {
    #[serde(default)]
    meeting_data: Option<MeetingData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    success: bool,
    email_sent: bool,
}

fn required(value: Option<String>, field: &str, missing: &mut Vec<String>) -> String {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => v,
        _ => {
            missing.push(field.to_string());
            String::new()
        }
    }
}

impl MeetingData {
    /// Check every field is present and non-blank.
    pub fn into_request(self) -> Result<MeetingRequest, FunctionError> {
        let mut missing = Vec::new();
        let full_name = required(self.full_name, "full_name", &mut missing);
        let email = required(self.email, "email", &mut missing);
        let company = required(self.company, "company", &mut missing);
        let message = required(self.message, "message", &mut missing);

        if !missing.is_empty() {
            return Err(FunctionError::bad_request(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        Ok(MeetingRequest {
            id: Uuid::new_v4().to_string(),
            full_name,
            email,
            company,
            message,
            created_at: Utc::now(),
        })
    }
}

/// Plain-text notification body for the sales inbox.
pub fn email_body(request: &MeetingRequest) -> String {
    format!(
        "New meeting request\n\nName: {}\nEmail: {}\nCompany: {}\n\nMessage:\n{}\n\nReceived: {}",
        request.full_name,
        request.email,
        request.company,
        request.message,
        request.created_at.to_rfc3339()
    )
}

/// Validate and store a meeting request, then log the email that would be
/// sent. No mail leaves the process.
pub async fn record_meeting_request(
    db: &dyn Database,
    data: MeetingData,
) -> Result<MeetingRequest, FunctionError> {
    let request = data.into_request()?;
    db.insert_meeting_request(&request).await?;
    tracing::info!(
        id = %request.id,
        email = %request.email,
        company = %request.company,
        body = %email_body(&request),
        "Meeting request stored; notification email not sent"
    );
    Ok(request)
}

/// POST /functions/v1/send-meeting-notification
pub async fn send_meeting_notification(
    State(state): State<AppState>,
    body: Result<Json<MeetingBody>, JsonRejection>,
) -> Result<Json<MeetingResponse>, FunctionError> {
    let Json(body) = body.map_err(|e| FunctionError::bad_request(e.body_text()))?;
    let data = body
        .meeting_data
        .ok_or_else(|| FunctionError::bad_request("Missing meetingData"))?;

    record_meeting_request(state.db.as_ref(), data).await?;
    Ok(Json(MeetingResponse {
        success: true,
        email_sent: false,
    }))
}

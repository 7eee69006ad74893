//! Allow-list diagnostic: how an email matches the stored approved emails.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::auth::normalize_email;
use crate::server::AppState;
use crate::store::Database;

use super::FunctionError;

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailReport {
    pub email: String,
    pub normalized_email: String,
    pub exact_match: bool,
    pub case_insensitive_match: bool,
    pub approved_emails: Vec<String>,
}

/// Compare `email` against the allow-list both as typed and normalized.
pub async fn verify_email_exists(
    db: &dyn Database,
    email: &str,
) -> Result<EmailReport, FunctionError> {
    let normalized = normalize_email(email);
    let exact_match = db.has_exact_approved_email(email).await?;
    let case_insensitive_match = db.is_email_approved(&normalized).await?;
    let approved_emails = db
        .list_approved_emails()
        .await?
        .into_iter()
        .map(|a| a.email)
        .collect();

    Ok(EmailReport {
        email: email.to_string(),
        normalized_email: normalized,
        exact_match,
        case_insensitive_match,
        approved_emails,
    })
}

/// POST /functions/v1/verify-email-exists
pub async fn handler(
    State(state): State<AppState>,
    body: Result<Json<VerifyBody>, JsonRejection>,
) -> Result<Json<EmailReport>, FunctionError> {
    if !state.expose_diagnostics {
        return Err(FunctionError::not_found());
    }
    let Json(body) = body.map_err(|e| FunctionError::bad_request(e.body_text()))?;
    let email = body
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| FunctionError::bad_request("Missing email"))?;

    let report = verify_email_exists(state.db.as_ref(), &email).await?;
    tracing::info!(
        email = %report.email,
        exact = report.exact_match,
        case_insensitive = report.case_insensitive_match,
        "Allow-list diagnostic"
    );
    Ok(Json(report))
}

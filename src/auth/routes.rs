//! REST endpoints for sign-in, sign-up, verification and sessions.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::notify::Notification;
use crate::server::AppState;

use super::extract::CurrentUser;
use super::model::{AuthPhase, Session, UserProfile, normalize_email};

#[derive(Debug, Deserialize)]
struct EmailBody {
    email: String,
}

#[derive(Debug, Deserialize)]
struct SignUpBody {
    email: String,
    full_name: String,
    #[serde(default)]
    company: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyBody {
    email: String,
    code: String,
}

#[derive(Debug, Serialize)]
struct ApprovalResponse {
    email: String,
    approved: bool,
}

#[derive(Debug, Serialize)]
struct FlowResponse {
    state: AuthPhase,
    notification: Notification,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    session: Session,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<UserProfile>,
}

#[derive(Debug, Serialize)]
struct VerifiedResponse {
    state: AuthPhase,
    session: Session,
    notification: Notification,
}

/// POST /api/auth/check
async fn check(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let approved = state.auth.check_email_approved(&body.email).await?;
    Ok(Json(ApprovalResponse {
        email: normalize_email(&body.email),
        approved,
    }))
}

/// POST /api/auth/otp
async fn request_code(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<Json<FlowResponse>, ApiError> {
    let phase = state.auth.sign_in_with_otp(&body.email).await?;
    Ok(Json(FlowResponse {
        state: phase,
        notification: Notification::success("Check your email")
            .with_description("We sent you a one-time sign-in code."),
    }))
}

/// POST /api/auth/signup
async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpBody>,
) -> Result<Json<FlowResponse>, ApiError> {
    let phase = state
        .auth
        .sign_up(&body.email, &body.full_name, body.company.as_deref())
        .await?;
    Ok(Json(FlowResponse {
        state: phase,
        notification: Notification::success("Account created")
            .with_description("We sent you a one-time code to finish signing up."),
    }))
}

/// POST /api/auth/verify
async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyBody>,
) -> Result<Json<VerifiedResponse>, ApiError> {
    let session = state.auth.verify_otp(&body.email, &body.code).await?;
    Ok(Json(VerifiedResponse {
        state: AuthPhase::Verified,
        session,
        notification: Notification::success("Signed in"),
    }))
}

/// GET /api/auth/session
async fn session(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<SessionResponse>, ApiError> {
    let profile = state.db.get_profile(&session.email).await?;
    Ok(Json(SessionResponse { session, profile }))
}

/// POST /api/auth/signout
async fn sign_out(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.auth.sign_out(&session.token).await?;
    state.wizards.discard_for(&session.email).await;
    Ok(Json(serde_json::json!({
        "state": AuthPhase::Anonymous,
        "notification": Notification::info("Signed out"),
    })))
}

/// GET /api/auth/flow?email=
async fn flow(
    State(state): State<AppState>,
    Query(query): Query<EmailBody>,
) -> Json<serde_json::Value> {
    let phase = state.auth.flow_phase(&query.email).await;
    Json(serde_json::json!({
        "email": normalize_email(&query.email),
        "state": phase,
    }))
}

/// Build the auth REST routes.
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/check", post(check))
        .route("/api/auth/otp", post(request_code))
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/verify", post(verify))
        .route("/api/auth/session", get(session))
        .route("/api/auth/signout", post(sign_out))
        .route("/api/auth/flow", get(flow))
        .with_state(state)
}

//! Editable marketing copy, stored as JSON documents under short keys.

use std::sync::LazyLock;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use regex::Regex;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ContentError};
use crate::server::AppState;
use crate::store::{ContentEntry, Database};

const MAX_KEY_LEN: usize = 128;

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid regex"));

/// Keys are 1 to 128 characters of `[A-Za-z0-9_.-]`.
pub fn validate_key(key: &str) -> Result<(), ContentError> {
    if key.is_empty() || key.len() > MAX_KEY_LEN || !KEY_RE.is_match(key) {
        return Err(ContentError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub async fn get_content(db: &dyn Database, key: &str) -> Result<ContentEntry, ContentError> {
    validate_key(key)?;
    db.get_content(key)
        .await?
        .ok_or_else(|| ContentError::NotFound(key.to_string()))
}

/// Upsert a document and return what is now stored.
pub async fn set_content(
    db: &dyn Database,
    key: &str,
    value: &serde_json::Value,
) -> Result<ContentEntry, ContentError> {
    validate_key(key)?;
    db.set_content(key, value).await?;
    get_content(db, key).await
}

/// GET /api/content/{key}
async fn read(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ContentEntry>, ApiError> {
    Ok(Json(get_content(state.db.as_ref(), &key).await?))
}

/// PUT /api/content/{key}
async fn write(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(key): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> Result<Json<ContentEntry>, ApiError> {
    let entry = set_content(state.db.as_ref(), &key, &value).await?;
    tracing::info!(key = %entry.key, editor = %session.email, "Site content updated");
    Ok(Json(entry))
}

/// Build the site content routes.
pub fn content_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/content/{key}", get(read).put(write))
        .with_state(state)
}

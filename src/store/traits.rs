//! `Database` trait: single async interface for all persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::model::{OtpRecord, Session, UserProfile};
use crate::error::DatabaseError;

/// An allow-list row. The email is stored exactly as it was entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedEmail {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// A "book a meeting" form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A stored block of editable marketing copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Backend-agnostic database trait covering the allow-list, auth state,
/// meeting requests and site content.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Allow-list ──────────────────────────────────────────────────

    /// Add an email to the allow-list. Returns false if an entry with the
    /// same normalized email already exists.
    async fn add_approved_email(
        &self,
        email: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<bool, DatabaseError>;

    /// Case-insensitive lookup. `normalized_email` must already be trimmed
    /// and lowercased.
    async fn is_email_approved(&self, normalized_email: &str) -> Result<bool, DatabaseError>;

    /// Byte-for-byte lookup, used only by the diagnostic endpoint.
    async fn has_exact_approved_email(&self, email: &str) -> Result<bool, DatabaseError>;

    /// All allow-list rows, oldest first.
    async fn list_approved_emails(&self) -> Result<Vec<ApprovedEmail>, DatabaseError>;

    // ── Profiles ────────────────────────────────────────────────────

    /// Insert or update a profile keyed by email. `created_at` is kept on update.
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), DatabaseError>;

    async fn get_profile(&self, email: &str) -> Result<Option<UserProfile>, DatabaseError>;

    // ── One-time codes ──────────────────────────────────────────────

    /// Store a code, replacing any previous code for the same email.
    async fn put_otp(&self, record: &OtpRecord) -> Result<(), DatabaseError>;

    async fn get_otp(&self, email: &str) -> Result<Option<OtpRecord>, DatabaseError>;

    /// Record a failed attempt. Returns the new attempt count.
    async fn increment_otp_attempts(&self, email: &str) -> Result<u32, DatabaseError>;

    async fn delete_otp(&self, email: &str) -> Result<bool, DatabaseError>;

    // ── Sessions ────────────────────────────────────────────────────

    async fn insert_session(&self, session: &Session) -> Result<(), DatabaseError>;

    async fn get_session(&self, token: &str) -> Result<Option<Session>, DatabaseError>;

    async fn delete_session(&self, token: &str) -> Result<bool, DatabaseError>;

    /// Delete codes and sessions that expired before `now`.
    /// Returns the number of rows removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError>;

    // ── Meeting requests ────────────────────────────────────────────

    async fn insert_meeting_request(&self, request: &MeetingRequest) -> Result<(), DatabaseError>;

    // ── Site content ────────────────────────────────────────────────

    async fn get_content(&self, key: &str) -> Result<Option<ContentEntry>, DatabaseError>;

    async fn set_content(&self, key: &str, value: &serde_json::Value)
    -> Result<(), DatabaseError>;
}

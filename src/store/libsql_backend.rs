//! libSQL backend: async `Database` trait implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::auth::model::{OtpRecord, Session, UserProfile, normalize_email};
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{ApprovedEmail, ContentEntry, Database, MeetingRequest};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
impl LibSqlBackend {
    /// Most recent first.
    pub(crate) async fn list_meeting_requests(
        &self,
        limit: usize,
    ) -> Result<Vec<MeetingRequest>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {MEETING_COLUMNS} FROM meeting_requests ORDER BY created_at DESC LIMIT ?1"
                ),
                params![limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_meeting_requests: {e}")))?;

        let mut requests = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_meeting(&row) {
                Ok(request) => requests.push(request),
                Err(e) => tracing::warn!("Skipping meeting request row: {e}"),
            }
        }
        Ok(requests)
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

fn row_to_approved_email(row: &libsql::Row) -> Result<ApprovedEmail, libsql::Error> {
    let email: String = row.get(0)?;
    let metadata = row
        .get::<String>(1)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok());
    let created_str: String = row.get(2)?;
    Ok(ApprovedEmail {
        email,
        metadata,
        created_at: parse_datetime(&created_str),
    })
}

fn row_to_profile(row: &libsql::Row) -> Result<UserProfile, libsql::Error> {
    let created_str: String = row.get(3)?;
    let updated_str: String = row.get(4)?;
    Ok(UserProfile {
        email: row.get(0)?,
        full_name: row.get(1)?,
        company: row.get::<String>(2).ok(),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn row_to_otp(row: &libsql::Row) -> Result<OtpRecord, libsql::Error> {
    let attempts: i64 = row.get(2)?;
    let created_str: String = row.get(3)?;
    let expires_str: String = row.get(4)?;
    Ok(OtpRecord {
        email: row.get(0)?,
        code: row.get(1)?,
        attempts: attempts.max(0) as u32,
        created_at: parse_datetime(&created_str),
        expires_at: parse_datetime(&expires_str),
    })
}

fn row_to_session(row: &libsql::Row) -> Result<Session, libsql::Error> {
    let created_str: String = row.get(2)?;
    let expires_str: String = row.get(3)?;
    Ok(Session {
        token: row.get(0)?,
        email: row.get(1)?,
        created_at: parse_datetime(&created_str),
        expires_at: parse_datetime(&expires_str),
    })
}

#[cfg(test)]
fn row_to_meeting(row: &libsql::Row) -> Result<MeetingRequest, libsql::Error> {
    let created_str: String = row.get(5)?;
    Ok(MeetingRequest {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        company: row.get(3)?,
        message: row.get(4)?,
        created_at: parse_datetime(&created_str),
    })
}

// ── Trait implementation ────────────────────────────────────────────

const APPROVED_COLUMNS: &str = "email, metadata, created_at";

const PROFILE_COLUMNS: &str = "email, full_name, company, created_at, updated_at";

const OTP_COLUMNS: &str = "email, code, attempts, created_at, expires_at";

const SESSION_COLUMNS: &str = "token, email, created_at, expires_at";

#[cfg(test)]
const MEETING_COLUMNS: &str = "id, full_name, email, company, message, created_at";

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Allow-list ──────────────────────────────────────────────────

    async fn add_approved_email(
        &self,
        email: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<bool, DatabaseError> {
        let metadata_str = metadata
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        let inserted = self
            .conn()
            .execute(
                "INSERT OR IGNORE INTO approved_emails (email, normalized_email, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    email,
                    normalize_email(email),
                    opt_text(metadata_str.as_deref()),
                    Utc::now().to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("add_approved_email: {e}")))?;

        debug!(email, inserted = inserted > 0, "Allow-list insert");
        Ok(inserted > 0)
    }

    async fn is_email_approved(&self, normalized_email: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT COUNT(*) FROM approved_emails WHERE normalized_email = ?1",
                params![normalized_email],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("is_email_approved: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0) > 0),
            Ok(None) => Ok(false),
            Err(e) => Err(DatabaseError::Query(format!("is_email_approved: {e}"))),
        }
    }

    async fn has_exact_approved_email(&self, email: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT COUNT(*) FROM approved_emails WHERE email = ?1",
                params![email],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("has_exact_approved_email: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0) > 0),
            Ok(None) => Ok(false),
            Err(e) => Err(DatabaseError::Query(format!("has_exact_approved_email: {e}"))),
        }
    }

    async fn list_approved_emails(&self) -> Result<Vec<ApprovedEmail>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {APPROVED_COLUMNS} FROM approved_emails ORDER BY created_at ASC, rowid ASC"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_approved_emails: {e}")))?;

        let mut emails = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_approved_email(&row) {
                Ok(entry) => emails.push(entry),
                Err(e) => tracing::warn!("Skipping allow-list row: {e}"),
            }
        }
        Ok(emails)
    }

    // ── Profiles ────────────────────────────────────────────────────

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO profiles (email, full_name, company, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (email) DO UPDATE SET full_name = ?2, company = ?3, updated_at = ?5",
                params![
                    profile.email.as_str(),
                    profile.full_name.as_str(),
                    opt_text(profile.company.as_deref()),
                    profile.created_at.to_rfc3339(),
                    profile.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("upsert_profile: {e}")))?;

        debug!(email = %profile.email, "Profile saved");
        Ok(())
    }

    async fn get_profile(&self, email: &str) -> Result<Option<UserProfile>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = ?1"),
                params![email],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_profile(&row)
                .map(Some)
                .map_err(|e| DatabaseError::Query(format!("get_profile row parse: {e}"))),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_profile: {e}"))),
        }
    }

    // ── One-time codes ──────────────────────────────────────────────

    async fn put_otp(&self, record: &OtpRecord) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO otp_codes (email, code, attempts, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (email) DO UPDATE SET code = ?2, attempts = ?3, created_at = ?4, expires_at = ?5",
                params![
                    record.email.as_str(),
                    record.code.as_str(),
                    record.attempts as i64,
                    record.created_at.to_rfc3339(),
                    record.expires_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("put_otp: {e}")))?;

        debug!(email = %record.email, expires_at = %record.expires_at, "One-time code stored");
        Ok(())
    }

    async fn get_otp(&self, email: &str) -> Result<Option<OtpRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {OTP_COLUMNS} FROM otp_codes WHERE email = ?1"),
                params![email],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_otp: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_otp(&row)
                .map(Some)
                .map_err(|e| DatabaseError::Query(format!("get_otp row parse: {e}"))),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_otp: {e}"))),
        }
    }

    async fn increment_otp_attempts(&self, email: &str) -> Result<u32, DatabaseError> {
        self.conn()
            .execute(
                "UPDATE otp_codes SET attempts = attempts + 1 WHERE email = ?1",
                params![email],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("increment_otp_attempts: {e}")))?;

        self.get_otp(email)
            .await?
            .map(|otp| otp.attempts)
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "otp_code".into(),
                id: email.to_string(),
            })
    }

    async fn delete_otp(&self, email: &str) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute("DELETE FROM otp_codes WHERE email = ?1", params![email])
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_otp: {e}")))?;
        Ok(count > 0)
    }

    // ── Sessions ────────────────────────────────────────────────────

    async fn insert_session(&self, session: &Session) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO sessions (token, email, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.token.as_str(),
                    session.email.as_str(),
                    session.created_at.to_rfc3339(),
                    session.expires_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_session: {e}")))?;

        debug!(email = %session.email, "Session created");
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE token = ?1"),
                params![token],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_session: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_session(&row)
                .map(Some)
                .map_err(|e| DatabaseError::Query(format!("get_session row parse: {e}"))),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_session: {e}"))),
        }
    }

    async fn delete_session(&self, token: &str) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_session: {e}")))?;
        Ok(count > 0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError> {
        let now = now.to_rfc3339();
        let codes = self
            .conn()
            .execute("DELETE FROM otp_codes WHERE expires_at < ?1", params![now.as_str()])
            .await
            .map_err(|e| DatabaseError::Query(format!("purge_expired otp_codes: {e}")))?;
        let sessions = self
            .conn()
            .execute("DELETE FROM sessions WHERE expires_at < ?1", params![now.as_str()])
            .await
            .map_err(|e| DatabaseError::Query(format!("purge_expired sessions: {e}")))?;

        let total = (codes + sessions) as usize;
        if total > 0 {
            info!(codes, sessions, "Purged expired auth rows");
        }
        Ok(total)
    }

    // ── Meeting requests ────────────────────────────────────────────

    async fn insert_meeting_request(&self, request: &MeetingRequest) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO meeting_requests (id, full_name, email, company, message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    request.id.as_str(),
                    request.full_name.as_str(),
                    request.email.as_str(),
                    request.company.as_str(),
                    request.message.as_str(),
                    request.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_meeting_request: {e}")))?;

        debug!(id = %request.id, "Meeting request inserted into DB");
        Ok(())
    }

    // ── Site content ────────────────────────────────────────────────

    async fn get_content(&self, key: &str) -> Result<Option<ContentEntry>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT key, value, updated_at FROM site_content WHERE key = ?1",
                params![key],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_content: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let key: String = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("get_content row parse: {e}")))?;
                let value_str: String = row.get(1).unwrap_or_else(|_| "null".to_string());
                let updated_str: String = row.get(2).unwrap_or_default();
                Ok(Some(ContentEntry {
                    key,
                    value: serde_json::from_str(&value_str).unwrap_or(serde_json::Value::Null),
                    updated_at: parse_datetime(&updated_str),
                }))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_content: {e}"))),
        }
    }

    async fn set_content(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError> {
        let value_str =
            serde_json::to_string(value).map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        self.conn()
            .execute(
                "INSERT INTO site_content (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3",
                params![key, value_str, now],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set_content: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    // ── Allow-list tests ────────────────────────────────────────────

    #[tokio::test]
    async fn approved_email_lookup_is_case_insensitive() {
        let db = test_db().await;
        assert!(db.add_approved_email("Jane@Example.com", None).await.unwrap());

        assert!(db.is_email_approved("jane@example.com").await.unwrap());
        assert!(!db.is_email_approved("john@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn non_ascii_casing_matches_and_dedupes() {
        let db = test_db().await;
        assert!(db.add_approved_email(" Élodie@Example.com", None).await.unwrap());

        assert!(db.is_email_approved("élodie@example.com").await.unwrap());
        assert!(!db.add_approved_email("ÉLODIE@EXAMPLE.COM", None).await.unwrap());
        assert_eq!(db.list_approved_emails().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn exact_match_respects_stored_casing() {
        let db = test_db().await;
        db.add_approved_email("Jane@Example.com", None).await.unwrap();

        assert!(db.has_exact_approved_email("Jane@Example.com").await.unwrap());
        assert!(!db.has_exact_approved_email("jane@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_approved_email_is_ignored() {
        let db = test_db().await;
        assert!(db.add_approved_email("a@b.com", None).await.unwrap());
        assert!(!db.add_approved_email("A@B.COM", None).await.unwrap());
        assert_eq!(db.list_approved_emails().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn approved_email_metadata_roundtrip() {
        let db = test_db().await;
        let meta = serde_json::json!({"source": "demo request"});
        db.add_approved_email("a@b.com", Some(&meta)).await.unwrap();

        let all = db.list_approved_emails().await.unwrap();
        assert_eq!(all[0].email, "a@b.com");
        assert_eq!(all[0].metadata, Some(meta));
    }

    // ── Profile tests ───────────────────────────────────────────────

    #[tokio::test]
    async fn profile_upsert_updates_name_keeps_created_at() {
        let db = test_db().await;
        let first = UserProfile::new("a@b.com", "Ann", Some("Acme"));
        db.upsert_profile(&first).await.unwrap();

        let mut second = UserProfile::new("a@b.com", "Ann Lee", None);
        second.created_at = Utc::now() + chrono::Duration::days(1);
        db.upsert_profile(&second).await.unwrap();

        let stored = db.get_profile("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.full_name, "Ann Lee");
        assert!(stored.company.is_none());
        assert_eq!(stored.created_at.timestamp(), first.created_at.timestamp());
    }

    #[tokio::test]
    async fn profile_not_found() {
        let db = test_db().await;
        assert!(db.get_profile("nobody@x.com").await.unwrap().is_none());
    }

    // ── OTP tests ───────────────────────────────────────────────────

    #[tokio::test]
    async fn otp_put_replaces_previous_code() {
        let db = test_db().await;
        db.put_otp(&OtpRecord::new("a@b.com", "111111".into(), Duration::from_secs(60)))
            .await
            .unwrap();
        db.increment_otp_attempts("a@b.com").await.unwrap();
        db.put_otp(&OtpRecord::new("a@b.com", "222222".into(), Duration::from_secs(60)))
            .await
            .unwrap();

        let otp = db.get_otp("a@b.com").await.unwrap().unwrap();
        assert_eq!(otp.code, "222222");
        assert_eq!(otp.attempts, 0);
    }

    #[tokio::test]
    async fn otp_attempts_increment() {
        let db = test_db().await;
        db.put_otp(&OtpRecord::new("a@b.com", "111111".into(), Duration::from_secs(60)))
            .await
            .unwrap();
        assert_eq!(db.increment_otp_attempts("a@b.com").await.unwrap(), 1);
        assert_eq!(db.increment_otp_attempts("a@b.com").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn otp_attempts_on_missing_code_is_not_found() {
        let db = test_db().await;
        let err = db.increment_otp_attempts("a@b.com").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn otp_delete() {
        let db = test_db().await;
        db.put_otp(&OtpRecord::new("a@b.com", "111111".into(), Duration::from_secs(60)))
            .await
            .unwrap();
        assert!(db.delete_otp("a@b.com").await.unwrap());
        assert!(!db.delete_otp("a@b.com").await.unwrap());
        assert!(db.get_otp("a@b.com").await.unwrap().is_none());
    }

    // ── Session tests ───────────────────────────────────────────────

    #[tokio::test]
    async fn session_crud() {
        let db = test_db().await;
        let session = Session::new("a@b.com", Duration::from_secs(3600));
        db.insert_session(&session).await.unwrap();

        let fetched = db.get_session(&session.token).await.unwrap().unwrap();
        assert_eq!(fetched.email, "a@b.com");
        assert_eq!(fetched.token, session.token);

        assert!(db.delete_session(&session.token).await.unwrap());
        assert!(db.get_session(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_rows() {
        let db = test_db().await;

        let mut old_otp = OtpRecord::new("old@b.com", "1".into(), Duration::from_secs(60));
        old_otp.expires_at = Utc::now() - chrono::Duration::hours(1);
        db.put_otp(&old_otp).await.unwrap();
        db.put_otp(&OtpRecord::new("new@b.com", "2".into(), Duration::from_secs(60)))
            .await
            .unwrap();

        let mut old_session = Session::new("old@b.com", Duration::from_secs(60));
        old_session.expires_at = Utc::now() - chrono::Duration::hours(1);
        db.insert_session(&old_session).await.unwrap();
        let fresh = Session::new("new@b.com", Duration::from_secs(3600));
        db.insert_session(&fresh).await.unwrap();

        let purged = db.purge_expired(Utc::now()).await.unwrap();
        assert_eq!(purged, 2);
        assert!(db.get_otp("new@b.com").await.unwrap().is_some());
        assert!(db.get_session(&fresh.token).await.unwrap().is_some());
        assert!(db.get_session(&old_session.token).await.unwrap().is_none());
    }

    // ── Meeting request tests ───────────────────────────────────────

    #[tokio::test]
    async fn meeting_requests_most_recent_first() {
        let db = test_db().await;
        for (i, name) in ["First", "Second"].iter().enumerate() {
            let request = MeetingRequest {
                id: uuid::Uuid::new_v4().to_string(),
                full_name: name.to_string(),
                email: "a@b.com".into(),
                company: "Acme".into(),
                message: "hi".into(),
                created_at: Utc::now() + chrono::Duration::seconds(i as i64),
            };
            db.insert_meeting_request(&request).await.unwrap();
        }

        let listed = db.list_meeting_requests(10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].full_name, "Second");

        let limited = db.list_meeting_requests(1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    // ── Content tests ───────────────────────────────────────────────

    #[tokio::test]
    async fn content_set_and_overwrite() {
        let db = test_db().await;
        assert!(db.get_content("hero").await.unwrap().is_none());

        db.set_content("hero", &serde_json::json!({"headline": "v1"}))
            .await
            .unwrap();
        db.set_content("hero", &serde_json::json!({"headline": "v2"}))
            .await
            .unwrap();

        let entry = db.get_content("hero").await.unwrap().unwrap();
        assert_eq!(entry.value["headline"], "v2");
    }

    #[tokio::test]
    async fn open_local_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("dir").join("test.db");
        let db = LibSqlBackend::new_local(&db_path).await.unwrap();
        assert!(db_path.exists());
        drop(db);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }
}

//! Auth data types: profiles, one-time codes, sessions, and the sign-in flow phases.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Trim and lowercase an email for allow-list comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize and check the basic `local@domain.tld` shape.
pub fn parse_email(email: &str) -> Result<String, AuthError> {
    let normalized = normalize_email(email);
    if EMAIL_RE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(AuthError::InvalidEmail(email.trim().to_string()))
    }
}

/// Where a given email is in the sign-in flow.
///
/// `Anonymous → CodeRequested → Verified` on success, `Anonymous → Denied`
/// when the email is not on the allow-list, `CodeRequested → Anonymous`
/// when verification fails (the user may retry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Anonymous,
    Denied,
    CodeRequested,
    Verified,
}

impl AuthPhase {
    /// Check if a transition from `self` to `target` is valid.
    ///
    /// Requesting a code is allowed from any non-terminal phase: a denied email
    /// may have been approved since, and a pending code may be re-sent.
    pub fn can_transition_to(&self, target: AuthPhase) -> bool {
        use AuthPhase::*;
        matches!(
            (self, target),
            (Anonymous | Denied | CodeRequested, CodeRequested)
                | (Anonymous | Denied | CodeRequested, Denied)
                | (CodeRequested, Verified)
                | (CodeRequested, Anonymous)
                | (Verified, Anonymous)
        )
    }

    /// Whether this phase is terminal (the user holds a session).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl Default for AuthPhase {
    fn default() -> Self {
        Self::Anonymous
    }
}

impl std::fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Anonymous => "anonymous",
            Self::Denied => "denied",
            Self::CodeRequested => "code_requested",
            Self::Verified => "verified",
        };
        write!(f, "{s}")
    }
}

/// Profile collected at sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(email: &str, full_name: &str, company: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            email: normalize_email(email),
            full_name: full_name.trim().to_string(),
            company: company
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A pending one-time sign-in code. One per email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub email: String,
    pub code: String,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn new(email: &str, code: String, ttl: std::time::Duration) -> Self {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::minutes(10));
        Self {
            email: normalize_email(email),
            code,
            attempts: 0,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// An authenticated session, identified by an opaque bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(email: &str, ttl: std::time::Duration) -> Self {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::days(7));
        Self {
            token: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(email),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

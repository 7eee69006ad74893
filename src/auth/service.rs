//! AuthService: allow-list gate, one-time code issuance and verification,
//! and session lookup.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{AuthError, DatabaseError};
use crate::store::Database;

use super::mailer::Mailer;
use super::model::{AuthPhase, OtpRecord, Session, UserProfile, normalize_email, parse_email};

/// Tunables for code issuance and sessions.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub otp_length: usize,
    pub otp_ttl: Duration,
    pub otp_max_attempts: u32,
    pub session_ttl: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for AuthSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            otp_length: config.otp_length,
            otp_ttl: config.otp_ttl,
            otp_max_attempts: config.otp_max_attempts,
            session_ttl: config.session_ttl,
        }
    }
}

/// Generate a numeric one-time code of `len` digits.
pub fn generate_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Last recorded phase for an email and when it was entered.
#[derive(Debug, Clone, Copy)]
struct FlowEntry {
    phase: AuthPhase,
    since: DateTime<Utc>,
}

/// Coordinates the sign-in flow: approval check, code issuance, verification
/// and sessions.
///
/// Every public operation performs a single logical action against the store
/// and, for code requests, one mail delivery. Nothing is retried.
///
/// Flow phases are kept only for syntactically valid emails. `Anonymous` is
/// never stored, and other phases are evicted by [`AuthService::prune_flows`].
pub struct AuthService {
    db: Arc<dyn Database>,
    mailer: Arc<dyn Mailer>,
    settings: AuthSettings,
    flows: RwLock<HashMap<String, FlowEntry>>,
}

impl AuthService {
    pub fn new(db: Arc<dyn Database>, mailer: Arc<dyn Mailer>, settings: AuthSettings) -> Self {
        Self {
            db,
            mailer,
            settings,
            flows: RwLock::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Whether `email` is on the allow-list, compared trimmed and lowercased.
    pub async fn check_email_approved(&self, email: &str) -> Result<bool, AuthError> {
        let normalized = normalize_email(email);
        if normalized.is_empty() {
            return Ok(false);
        }
        Ok(self.db.is_email_approved(&normalized).await?)
    }

    /// Request a sign-in code for an approved email.
    pub async fn sign_in_with_otp(&self, email: &str) -> Result<AuthPhase, AuthError> {
        let email = parse_email(email)?;
        self.ensure_approved(&email).await?;
        self.issue_code(&email).await
    }

    /// Store the profile of an approved email and send it a sign-in code.
    pub async fn sign_up(
        &self,
        email: &str,
        full_name: &str,
        company: Option<&str>,
    ) -> Result<AuthPhase, AuthError> {
        let email = parse_email(email)?;
        self.ensure_approved(&email).await?;

        if full_name.trim().is_empty() {
            return Err(AuthError::MissingName);
        }

        let mut profile = UserProfile::new(&email, full_name, company);
        if let Some(existing) = self.db.get_profile(&email).await? {
            profile.created_at = existing.created_at;
        }
        self.db.upsert_profile(&profile).await?;
        info!(email = %email, "Profile saved at sign-up");

        self.issue_code(&email).await
    }

    /// Exchange a code for a session.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<Session, AuthError> {
        let email = parse_email(email)?;
        let code = code.trim();

        let Some(otp) = self.db.get_otp(&email).await? else {
            return Err(AuthError::NoPendingCode { email });
        };

        if otp.is_expired() {
            self.db.delete_otp(&email).await?;
            self.set_phase(&email, AuthPhase::Anonymous).await;
            info!(email = %email, "Expired sign-in code presented");
            return Err(AuthError::CodeExpired);
        }

        if otp.code != code {
            let attempts = self.db.increment_otp_attempts(&email).await?;
            self.set_phase(&email, AuthPhase::Anonymous).await;
            if attempts >= self.settings.otp_max_attempts {
                self.db.delete_otp(&email).await?;
                warn!(email = %email, attempts, "Sign-in code discarded after too many attempts");
                return Err(AuthError::TooManyAttempts);
            }
            debug!(email = %email, attempts, "Wrong sign-in code");
            return Err(AuthError::InvalidCode);
        }

        self.db.delete_otp(&email).await?;
        let session = Session::new(&email, self.settings.session_ttl);
        self.db.insert_session(&session).await?;
        self.set_phase(&email, AuthPhase::Verified).await;

        info!(email = %email, expires_at = %session.expires_at, "Signed in");
        Ok(session)
    }

    /// Resolve a bearer token to a live session.
    pub async fn current_session(&self, token: &str) -> Result<Session, AuthError> {
        let session = self
            .db
            .get_session(token)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if session.is_expired() {
            self.db.delete_session(token).await?;
            return Err(AuthError::Unauthenticated);
        }
        Ok(session)
    }

    /// Drop the session for `token`. Unknown tokens are ignored.
    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        if let Some(session) = self.db.get_session(token).await? {
            self.db.delete_session(token).await?;
            self.set_phase(&session.email, AuthPhase::Anonymous).await;
            info!(email = %session.email, "Signed out");
        }
        Ok(())
    }

    /// Current flow phase for an email. Emails never seen are anonymous.
    pub async fn flow_phase(&self, email: &str) -> AuthPhase {
        let email = normalize_email(email);
        self.flows
            .read()
            .await
            .get(&email)
            .map(|entry| entry.phase)
            .unwrap_or_default()
    }

    /// Forget flow phases that have outlived what they describe: denied and
    /// code-requested entries after the code TTL, verified entries after the
    /// session TTL. Returns how many were removed.
    pub async fn prune_flows(&self, now: DateTime<Utc>) -> usize {
        let mut flows = self.flows.write().await;
        let before = flows.len();
        flows.retain(|_, entry| {
            let ttl = if entry.phase.is_terminal() {
                self.settings.session_ttl
            } else {
                self.settings.otp_ttl
            };
            (now - entry.since).to_std().map_or(true, |age| age < ttl)
        });
        before - flows.len()
    }

    #[cfg(test)]
    async fn tracked_flows(&self) -> usize {
        self.flows.read().await.len()
    }

    /// Insert configured emails into the allow-list. Returns how many were new.
    pub async fn seed_approved_emails(&self, emails: &[String]) -> Result<usize, DatabaseError> {
        let meta = serde_json::json!({ "source": "config" });
        let mut added = 0;
        for email in emails {
            if self.db.add_approved_email(email.trim(), Some(&meta)).await? {
                added += 1;
            }
        }
        Ok(added)
    }

    async fn ensure_approved(&self, email: &str) -> Result<(), AuthError> {
        if self.db.is_email_approved(email).await? {
            return Ok(());
        }
        self.set_phase(email, AuthPhase::Denied).await;
        warn!(email = %email, "Sign-in attempt from email not on the allow-list");
        Err(AuthError::AccessDenied {
            email: email.to_string(),
        })
    }

    /// Deliver a fresh code, then store it. A failed delivery leaves any
    /// earlier code and its phase untouched.
    async fn issue_code(&self, email: &str) -> Result<AuthPhase, AuthError> {
        let code = generate_code(self.settings.otp_length);
        let record = OtpRecord::new(email, code, self.settings.otp_ttl);

        if let Err(e) = self.mailer.send_code(email, &record.code).await {
            warn!(email = %email, error = %e, "Sign-in code delivery failed");
            return Err(e.into());
        }
        self.db.put_otp(&record).await?;

        self.set_phase(email, AuthPhase::CodeRequested).await;
        info!(email = %email, expires_at = %record.expires_at, "Sign-in code issued");
        Ok(AuthPhase::CodeRequested)
    }

    async fn set_phase(&self, email: &str, target: AuthPhase) {
        let mut flows = self.flows.write().await;
        let current = flows.get(email).map(|entry| entry.phase).unwrap_or_default();
        if current != target && !current.can_transition_to(target) {
            debug!(email, from = %current, to = %target, "Auth flow reset outside the normal path");
        }
        if target == AuthPhase::Anonymous {
            flows.remove(email);
        } else {
            flows.insert(
                email.to_string(),
                FlowEntry {
                    phase: target,
                    since: Utc::now(),
                },
            );
        }
    }
}

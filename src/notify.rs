//! User-facing notifications, rendered by the UI as toasts.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A short message with an optional description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {}", self.title, description),
            None => write!(f, "{}", self.title),
        }
    }
}

impl From<&AuthError> for Notification {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::AccessDenied { .. } => Notification::error("Access denied")
                .with_description(
                    "This email is not approved for access yet. Book a demo to request access.",
                ),
            AuthError::InvalidEmail(_) => {
                Notification::error("Invalid email").with_description(err.to_string())
            }
            AuthError::MissingName => Notification::error("Name required")
                .with_description("Enter your full name to create an account."),
            AuthError::InvalidCode => Notification::error("Invalid code")
                .with_description("Check the code from your email and try again."),
            AuthError::CodeExpired => Notification::error("Code expired")
                .with_description("Request a new code to sign in."),
            AuthError::TooManyAttempts => Notification::error("Too many attempts")
                .with_description("Request a new code to sign in."),
            AuthError::NoPendingCode { .. } => Notification::error("No code requested")
                .with_description("Request a sign-in code first."),
            AuthError::Unauthenticated => Notification::error("Not signed in"),
            AuthError::Database(_) => Notification::error("Something went wrong")
                .with_description("Please try again in a moment."),
            AuthError::Mail(_) => Notification::error("Something went wrong")
                .with_description("We couldn't send your sign-in code. Please try again."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_omitted_when_absent() {
        let json = serde_json::to_value(Notification::success("Saved")).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["title"], "Saved");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn display_joins_title_and_description() {
        let n = Notification::error("Code expired").with_description("Request a new code.");
        assert_eq!(n.to_string(), "Code expired: Request a new code.");
    }

    #[test]
    fn internal_auth_failures_hide_details() {
        let db = AuthError::Database(crate::error::DatabaseError::Query(
            "get_otp: no such table: otp_codes".into(),
        ));
        let mail = AuthError::Mail(crate::error::MailError::Transport(
            "SMTP relay error: smtp.internal:587 refused".into(),
        ));
        for err in [db, mail] {
            let rendered = Notification::from(&err).to_string();
            assert!(rendered.starts_with("Something went wrong"));
            assert!(!rendered.contains("otp_codes"));
            assert!(!rendered.contains("smtp.internal"));
        }
    }
}

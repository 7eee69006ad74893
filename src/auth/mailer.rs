//! Outbound delivery of sign-in codes.
//!
//! `SmtpMailer` sends through an SMTP relay with lettre. `LogMailer` writes
//! the code to the log and is used when no SMTP host is configured.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use tracing::info;

use crate::config::SmtpConfig;
use crate::error::MailError;

/// Delivers a one-time code to an email address.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError>;
}

/// Subject line for sign-in code mail.
pub const CODE_SUBJECT: &str = "Your Brand Pulse sign-in code";

/// Plain-text body for sign-in code mail.
pub fn code_body(code: &str) -> String {
    format!(
        "Your sign-in code is {code}\n\n\
         Enter it on the sign-in page to continue. The code expires shortly \
         and can only be used once.\n\n\
         If you did not request this code you can ignore this email."
    )
}

/// SMTP relay mailer.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, to: &str, code: &str) -> Result<Message, MailError> {
        Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| MailError::InvalidAddress {
                        address: self.config.from_address.clone(),
                        reason: format!("{e}"),
                    })?,
            )
            .to(to.parse().map_err(|e| MailError::InvalidAddress {
                address: to.to_string(),
                reason: format!("{e}"),
            })?)
            .subject(CODE_SUBJECT)
            .body(code_body(code))
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        let email = self.build_message(to, code)?;

        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.expose_secret().to_string(),
        );
        let transport = SmtpTransport::relay(&self.config.host)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?
            .port(self.config.port)
            .credentials(creds)
            .build();

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| MailError::Transport(format!("send task failed: {e}")))?
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!(to, "Sign-in code email sent");
        Ok(())
    }
}

/// Development mailer: logs the code instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        info!(to, code, "SMTP not configured; sign-in code logged instead of mailed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn smtp_config(from: &str) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: "user".into(),
            password: SecretString::from("pw".to_string()),
            from_address: from.into(),
        }
    }

    #[test]
    fn body_contains_code() {
        assert!(code_body("493021").contains("493021"));
    }

    #[test]
    fn build_message_rejects_bad_recipient() {
        let mailer = SmtpMailer::new(smtp_config("noreply@brandpulse.io"));
        let err = mailer.build_message("not an address", "123456").unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress { .. }));
    }

    #[test]
    fn build_message_rejects_bad_sender() {
        let mailer = SmtpMailer::new(smtp_config("broken"));
        let err = mailer.build_message("a@b.com", "123456").unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress { .. }));
    }

    #[test]
    fn build_message_ok() {
        let mailer = SmtpMailer::new(smtp_config("noreply@brandpulse.io"));
        assert!(mailer.build_message("a@b.com", "123456").is_ok());
    }

    #[tokio::test]
    async fn log_mailer_never_fails() {
        LogMailer.send_code("a@b.com", "123456").await.unwrap();
    }
}

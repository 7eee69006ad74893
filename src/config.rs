//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Path of the libSQL database file.
    pub db_path: PathBuf,
    /// Number of digits in a one-time code.
    pub otp_length: usize,
    /// How long a one-time code stays valid.
    pub otp_ttl: Duration,
    /// Wrong codes allowed before the code is discarded.
    pub otp_max_attempts: u32,
    /// Session lifetime after a successful verification.
    pub session_ttl: Duration,
    /// Interval of the expired code/session sweep.
    pub sweep_interval: Duration,
    /// Emails inserted into the allow-list at startup.
    pub approved_emails: Vec<String>,
    /// Serve `verify-email-exists`, which dumps the allow-list.
    pub expose_diagnostics: bool,
    /// Allowed CORS origin. `None` allows any origin.
    pub cors_origin: Option<String>,
    /// Directory for rolling log files. `None` logs to stderr only.
    pub log_dir: Option<PathBuf>,
    /// SMTP settings for one-time code mail. `None` logs codes instead.
    pub smtp: Option<SmtpConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/brand-pulse.db"),
            otp_length: 6,
            otp_ttl: Duration::from_secs(600), // 10 minutes
            otp_max_attempts: 5,
            session_ttl: Duration::from_secs(168 * 3600), // 7 days
            sweep_interval: Duration::from_secs(300),
            approved_emails: Vec::new(),
            expose_diagnostics: false,
            cors_origin: None,
            log_dir: None,
            smtp: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `BRAND_PULSE_*` and `SMTP_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let session_hours: u64 = parse_var("BRAND_PULSE_SESSION_TTL_HOURS", 168)?;

        let config = Self {
            port: parse_var("BRAND_PULSE_PORT", defaults.port)?,
            db_path: std::env::var("BRAND_PULSE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            otp_length: parse_var("BRAND_PULSE_OTP_LENGTH", defaults.otp_length)?,
            otp_ttl: Duration::from_secs(parse_var("BRAND_PULSE_OTP_TTL_SECS", 600)?),
            otp_max_attempts: parse_var("BRAND_PULSE_OTP_MAX_ATTEMPTS", defaults.otp_max_attempts)?,
            session_ttl: Duration::from_secs(session_hours * 3600),
            sweep_interval: Duration::from_secs(parse_var("BRAND_PULSE_SWEEP_INTERVAL_SECS", 300)?),
            approved_emails: split_list(
                &std::env::var("BRAND_PULSE_APPROVED_EMAILS").unwrap_or_default(),
            ),
            expose_diagnostics: parse_var(
                "BRAND_PULSE_EXPOSE_DIAGNOSTICS",
                defaults.expose_diagnostics,
            )?,
            cors_origin: std::env::var("BRAND_PULSE_CORS_ORIGIN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            log_dir: std::env::var("BRAND_PULSE_LOG_DIR").ok().map(PathBuf::from),
            smtp: SmtpConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=10).contains(&self.otp_length) {
            return Err(ConfigError::InvalidValue {
                key: "BRAND_PULSE_OTP_LENGTH".into(),
                message: format!("{} is outside 4..=10", self.otp_length),
            });
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "BRAND_PULSE_SWEEP_INTERVAL_SECS".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// SMTP relay settings for outbound sign-in codes.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl SmtpConfig {
    /// Returns `Ok(None)` when `SMTP_HOST` is not set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(host) = std::env::var("SMTP_HOST") else {
            return Ok(None);
        };

        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let from_address = std::env::var("SMTP_FROM_ADDRESS").unwrap_or_else(|_| username.clone());
        if from_address.is_empty() {
            return Err(ConfigError::MissingEnvVar("SMTP_FROM_ADDRESS".into()));
        }

        Ok(Some(Self {
            host,
            port: parse_var("SMTP_PORT", 587)?,
            username,
            password: SecretString::from(std::env::var("SMTP_PASSWORD").unwrap_or_default()),
            from_address,
        }))
    }
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_var<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

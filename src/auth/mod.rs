//! Passwordless sign-in gated by an email allow-list.
//!
//! An email must be on the allow-list before a one-time code is issued for
//! it. Verifying the code yields a session token that the dashboard sends as
//! a bearer token.

pub mod extract;
pub mod mailer;
pub mod model;
pub mod routes;
pub mod service;

pub use extract::CurrentUser;
pub use mailer::{LogMailer, Mailer, SmtpMailer};
pub use model::{AuthPhase, OtpRecord, Session, UserProfile, normalize_email};
pub use routes::auth_routes;
pub use service::{AuthService, AuthSettings};

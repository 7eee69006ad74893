//! Persistence layer: libSQL-backed storage for the allow-list, auth state,
//! meeting requests and site content.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{ApprovedEmail, ContentEntry, Database, MeetingRequest};

//! Brand Pulse: backend for a brand-monitoring dashboard.

pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod functions;
pub mod notify;
pub mod search;
pub mod server;
pub mod store;
pub mod wizard;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use brand_pulse::auth::{AuthService, AuthSettings, LogMailer, Mailer, SmtpMailer};
use brand_pulse::config::AppConfig;
use brand_pulse::error::Result;
use brand_pulse::server::{self, AppState};
use brand_pulse::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AppConfig::from_env()?;

    // Initialize tracing, optionally mirrored to a daily log file
    let (file_layer, _log_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "brand-pulse.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    eprintln!("Brand Pulse v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);
    eprintln!("   Functions: http://0.0.0.0:{}/functions/v1", config.port);

    // ── Database ─────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);
    eprintln!("   Database: {}", config.db_path.display());

    // ── Auth ─────────────────────────────────────────────────────────────
    let mailer: Arc<dyn Mailer> = match config.smtp.clone() {
        Some(smtp) => {
            eprintln!("   Mail: SMTP via {}:{}", smtp.host, smtp.port);
            Arc::new(SmtpMailer::new(smtp))
        }
        None => {
            eprintln!("   Mail: disabled (codes are logged)");
            Arc::new(LogMailer)
        }
    };
    let auth = Arc::new(AuthService::new(
        Arc::clone(&db),
        mailer,
        AuthSettings::from(&config),
    ));

    match auth.seed_approved_emails(&config.approved_emails).await {
        Ok(0) => {}
        Ok(added) => eprintln!("   Allow-list: {added} emails added"),
        Err(e) => tracing::warn!(error = %e, "Failed to seed approved emails"),
    }

    if config.expose_diagnostics {
        eprintln!("   Diagnostics: verify-email-exists enabled");
    }

    // ── HTTP ─────────────────────────────────────────────────────────────
    let state = AppState::new(db, auth, config.expose_diagnostics);
    let _sweep_handle = server::spawn_sweep_task(state.clone(), config.sweep_interval);
    let cors = server::cors_layer(config.cors_origin.as_deref())?;
    let app = server::build_router(state, cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    server::serve(listener, app).await?;

    eprintln!("Server shut down");
    Ok(())
}

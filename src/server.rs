//! HTTP surface: shared state, router assembly and the serve loop.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::auth::{AuthService, auth_routes};
use crate::content::content_routes;
use crate::error::ConfigError;
use crate::functions::function_routes;
use crate::search::search_routes;
use crate::store::Database;
use crate::wizard::{WizardManager, wizard_routes};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub auth: Arc<AuthService>,
    pub wizards: Arc<WizardManager>,
    /// Serve the allow-list diagnostic function.
    pub expose_diagnostics: bool,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, auth: Arc<AuthService>, expose_diagnostics: bool) -> Self {
        Self {
            db,
            auth,
            wizards: Arc::new(WizardManager::new()),
            expose_diagnostics,
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "brand-pulse",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// CORS for the dashboard. `None` allows any origin.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, ConfigError> {
    let allow_origin = match origin {
        Some(origin) => AllowOrigin::exact(HeaderValue::from_str(origin).map_err(|e| {
            ConfigError::InvalidValue {
                key: "BRAND_PULSE_CORS_ORIGIN".into(),
                message: e.to_string(),
            }
        })?),
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60)))
}

/// Every route, without middleware.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth_routes(state.clone()))
        .merge(wizard_routes(state.clone()))
        .merge(search_routes(state.clone()))
        .merge(content_routes(state.clone()))
        .merge(function_routes(state))
}

/// Every route with request tracing and CORS applied.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    routes(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}

/// One pass of housekeeping: expired codes and sessions in the store, stale
/// auth flow phases, and submitted or idle wizards. Wizards idle for longer
/// than a session lasts are dropped.
pub async fn sweep(state: &AppState) {
    let now = Utc::now();
    match state.db.purge_expired(now).await {
        Ok(0) => {}
        Ok(purged) => debug!(purged, "Expired auth rows removed"),
        Err(e) => warn!(error = %e, "Expired auth row sweep failed"),
    }

    let flows = state.auth.prune_flows(now).await;
    let cutoff = chrono::Duration::from_std(state.auth.settings().session_ttl)
        .ok()
        .and_then(|max_idle| now.checked_sub_signed(max_idle))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let wizards = state.wizards.purge_stale(cutoff).await;
    if flows > 0 || wizards > 0 {
        debug!(flows, wizards, "Stale in-memory state dropped");
    }
}

/// Run [`sweep`] every `every`. `every` must be non-zero.
pub fn spawn_sweep_task(state: AppState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            sweep(&state).await;
        }
    })
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

//! REST endpoints for dashboard search and the prompt sandbox.

use axum::extract::Query;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::error::{ApiError, SearchError};
use crate::server::AppState;
use crate::wizard::{ModelResponse, Question, Sentiment};

use super::mock_data::MOCK_QUESTIONS;
use super::{SearchFilters, SearchReport, sandbox, search, summarize};

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    model: Option<String>,
    sentiment: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    results: Vec<Question>,
    report: SearchReport,
}

#[derive(Debug, Deserialize)]
struct SandboxBody {
    prompt: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    models: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SandboxResponse {
    prompt: String,
    responses: Vec<ModelResponse>,
}

/// GET /api/search?q=&model=&sentiment=
async fn run_search(
    _user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let sentiment = match query.sentiment.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(
            s.parse::<Sentiment>()
                .map_err(|_| SearchError::UnknownSentiment(s.to_string()))?,
        ),
    };
    let filters = SearchFilters {
        model: query
            .model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty()),
        sentiment,
        ..SearchFilters::new(&query.q)
    };

    let results = search(&MOCK_QUESTIONS, &filters);
    let report = summarize(&results);
    tracing::debug!(query = %filters.query, hits = results.len(), "Search");
    Ok(Json(SearchResponse { results, report }))
}

/// POST /api/sandbox
async fn run_sandbox(
    _user: CurrentUser,
    Json(body): Json<SandboxBody>,
) -> Result<Json<SandboxResponse>, ApiError> {
    let responses = sandbox(&body.prompt, &body.brand, &body.models)?;
    Ok(Json(SandboxResponse {
        prompt: body.prompt.trim().to_string(),
        responses,
    }))
}

/// Build the search and sandbox routes.
pub fn search_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/search", get(run_search))
        .route("/api/sandbox", post(run_sandbox))
        .with_state(state)
}

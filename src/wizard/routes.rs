//! REST endpoints for the brand setup wizard.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::notify::Notification;
use crate::server::AppState;

use super::model::{BrandEntity, ItemKind, SocialLink, WizardItem};
use super::state::{StepSummary, WizardState, WizardStep};
use super::suggestions::suggestions_for;

#[derive(Debug, Serialize)]
struct WizardView {
    wizard: WizardState,
    steps: Vec<StepSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<Notification>,
}

impl WizardView {
    fn new(wizard: WizardState) -> Self {
        Self {
            steps: wizard.step_summaries(),
            wizard,
            notification: None,
        }
    }

    fn notify(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }
}

#[derive(Debug, Deserialize)]
struct BrandBody {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    website: String,
    #[serde(default)]
    social_links: Vec<SocialLink>,
}

#[derive(Debug, Deserialize)]
struct SuggestionQuery {
    brand: Option<String>,
}

/// POST /api/wizard
async fn create(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Json<WizardView> {
    let wizard = state.wizards.create(&session.email).await;
    Json(WizardView::new(wizard))
}

/// GET /api/wizard
async fn list(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Json<Vec<WizardView>> {
    let wizards = state.wizards.list_for(&session.email).await;
    Json(wizards.into_iter().map(WizardView::new).collect())
}

/// GET /api/wizard/{id}
async fn get_wizard(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>, ApiError> {
    let wizard = state.wizards.get(id, &session.email).await?;
    Ok(Json(WizardView::new(wizard)))
}

/// GET /api/wizard/{id}/steps
async fn steps(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StepSummary>>, ApiError> {
    let wizard = state.wizards.get(id, &session.email).await?;
    Ok(Json(wizard.step_summaries()))
}

/// PUT /api/wizard/{id}/brand
async fn update_brand(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<BrandBody>,
) -> Result<Json<WizardView>, ApiError> {
    let brand = BrandEntity::from_input(&body.name, body.aliases, &body.website, body.social_links);
    let (_, wizard) = state
        .wizards
        .mutate(id, &session.email, |w| w.update_brand(brand))
        .await?;
    Ok(Json(WizardView::new(wizard)))
}

/// POST /api/wizard/{id}/items
async fn add_item(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
    Json(item): Json<WizardItem>,
) -> Result<Json<WizardView>, ApiError> {
    let (_, wizard) = state
        .wizards
        .mutate(id, &session.email, |w| w.upsert_item(item))
        .await?;
    Ok(Json(WizardView::new(wizard)))
}

/// DELETE /api/wizard/{id}/items/{kind}/{item_id}
async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path((id, kind, item_id)): Path<(Uuid, String, String)>,
) -> Result<Json<WizardView>, ApiError> {
    let kind: ItemKind = kind.parse()?;
    let (_, wizard) = state
        .wizards
        .mutate(id, &session.email, |w| w.remove_item(kind, &item_id))
        .await?;
    Ok(Json(WizardView::new(wizard)))
}

/// POST /api/wizard/{id}/next
async fn next(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>, ApiError> {
    let (_, wizard) = state
        .wizards
        .mutate(id, &session.email, |w| w.next_step())
        .await?;
    Ok(Json(WizardView::new(wizard)))
}

/// POST /api/wizard/{id}/prev
async fn prev(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>, ApiError> {
    let (_, wizard) = state
        .wizards
        .mutate(id, &session.email, |w| w.prev_step())
        .await?;
    Ok(Json(WizardView::new(wizard)))
}

/// POST /api/wizard/{id}/submit
async fn submit(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>, ApiError> {
    let (notification, wizard) = state
        .wizards
        .mutate(id, &session.email, |w| w.submit())
        .await?;
    tracing::info!(
        wizard = %id,
        owner = %session.email,
        brand = %wizard.brand.name,
        products = wizard.products.len(),
        topics = wizard.topics.len(),
        personas = wizard.personas.len(),
        questions = wizard.questions.len(),
        "Brand setup submitted"
    );
    Ok(Json(WizardView::new(wizard).notify(notification)))
}

/// GET /api/wizard/suggestions/{step}?brand=
async fn suggestions(
    Path(step): Path<String>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<WizardItem>>, ApiError> {
    let step: WizardStep = step.parse()?;
    Ok(Json(suggestions_for(step, query.brand.as_deref())))
}

/// Build the wizard REST routes.
pub fn wizard_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/wizard", get(list).post(create))
        .route("/api/wizard/suggestions/{step}", get(suggestions))
        .route("/api/wizard/{id}", get(get_wizard))
        .route("/api/wizard/{id}/steps", get(steps))
        .route("/api/wizard/{id}/brand", put(update_brand))
        .route("/api/wizard/{id}/items", post(add_item))
        .route("/api/wizard/{id}/items/{kind}/{item_id}", delete(remove_item))
        .route("/api/wizard/{id}/next", post(next))
        .route("/api/wizard/{id}/prev", post(prev))
        .route("/api/wizard/{id}/submit", post(submit))
        .with_state(state)
}

//! # Catalog API
//!
//! Listing with live search, and reload.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use storefront_core::{present, AppCard, LoadStatus};

use super::ApiResponse;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Search string matched against app names
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppCardResponse {
    pub name: String,
    pub icon: String,
    pub description: String,
    pub features: Vec<String>,
    pub gallery: Vec<String>,
    pub installed: bool,
}

impl From<AppCard> for AppCardResponse {
    fn from(card: AppCard) -> Self {
        Self {
            name: card.name,
            icon: card.icon,
            description: card.description,
            features: card.features,
            gallery: card.gallery,
            installed: card.installed,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogStatus {
    /// One of `idle`, `loading`, `ready`, `failed`
    pub state: String,
    pub error: Option<String>,
}

impl From<&LoadStatus> for CatalogStatus {
    fn from(status: &LoadStatus) -> Self {
        let (state, error) = match status {
            LoadStatus::Idle => ("idle", None),
            LoadStatus::Loading => ("loading", None),
            LoadStatus::Ready => ("ready", None),
            LoadStatus::Failed(message) => ("failed", Some(message.clone())),
        };
        Self {
            state: state.to_string(),
            error,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub status: CatalogStatus,
    pub apps: Vec<AppCardResponse>,
}

pub fn catalog_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_catalog))
        .route("/reload", post(reload_catalog))
}

/// List apps, filtered by name
#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    tag = "catalog",
    params(("q" = Option<String>, Query, description = "Case-insensitive name search")),
    responses(
        (status = 200, description = "Matching apps in catalog order", body = CatalogResponse)
    )
)]
pub async fn list_catalog(
    State(state): State<SharedState>,
    Query(params): Query<CatalogQuery>,
) -> Json<CatalogResponse> {
    let (catalog, status) = {
        let current = state.catalog.read().await;
        (current.catalog(), CatalogStatus::from(current.status()))
    };

    let mut registry = state.registry.lock().await;
    registry.refresh();
    let query = params.q.as_deref().unwrap_or("");
    let apps = present(&catalog, query, &registry)
        .into_iter()
        .map(AppCardResponse::from)
        .collect();

    Json(CatalogResponse { status, apps })
}

/// Fetch the catalog again
#[utoipa::path(
    post,
    path = "/api/v1/catalog/reload",
    tag = "catalog",
    responses(
        (status = 200, description = "Reload outcome", body = ApiResponse)
    )
)]
pub async fn reload_catalog(State(state): State<SharedState>) -> Json<ApiResponse> {
    if !state.reload_catalog().await {
        return Json(ApiResponse::ok("Superseded by a newer reload"));
    }

    let current = state.catalog.read().await;
    match current.status() {
        LoadStatus::Failed(message) => Json(ApiResponse::error(format!(
            "Error loading store: {}",
            message
        ))),
        _ => Json(ApiResponse::ok(format!(
            "Loaded {} apps",
            current.catalog().len()
        ))),
    }
}

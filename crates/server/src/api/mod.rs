//! # HTTP API
//!
//! Routes under `/api/v1`.

pub mod apps;
pub mod catalog;
pub mod config;

use axum::{http::header, response::IntoResponse, routing::get, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::state::SharedState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "1.0.0",
        description = "Browse the app catalog and manage installed apps"
    ),
    paths(
        catalog::list_catalog,
        catalog::reload_catalog,
        apps::list_installed,
        apps::install_app,
        apps::uninstall_app,
        config::get_config,
        config::update_config
    ),
    components(schemas(
        ApiResponse,
        catalog::AppCardResponse,
        catalog::CatalogResponse,
        catalog::CatalogStatus,
        apps::InstalledResponse,
        config::ConfigPayload,
        config::ConfigResponse
    )),
    tags(
        (name = "catalog", description = "Catalog listing and search"),
        (name = "apps", description = "Install and uninstall"),
        (name = "config", description = "Configuration management")
    )
)]
pub struct ApiDoc;

async fn serve_openapi() -> impl IntoResponse {
    let spec = ApiDoc::openapi().to_json().unwrap_or_default();
    ([(header::CONTENT_TYPE, "application/json")], spec)
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .nest("/api/v1/catalog", catalog::catalog_routes())
        .nest("/api/v1", apps::app_routes())
        .route(
            "/api/v1/config",
            get(config::get_config).patch(config::update_config),
        )
        .route("/api/v1/openapi.json", get(serve_openapi))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use storefront_core::catalog::StaticCatalogSource;
    use storefront_core::storage::INSTALLED_APPS_KEY;
    use storefront_core::{
        BroadcastNotifier, CatalogLoader, InstallationRegistry, KeyValueStore, MemoryStore,
    };

    use crate::state::{AppState, SharedState};

    pub const INDEX: &str = r#"[
        {"name": "Calculator", "icon": "c.png", "data": {"desc": "Math", "feat": "Add\nSubtract"}},
        {"name": "Notepad", "icon": "n.png",
         "data": {"desc": "Text", "feat": "Edit", "gallery": ["1", "2", "3", "4"]}}
    ]"#;

    /// State over a static catalog, already loaded
    pub async fn loaded_state(store: Arc<MemoryStore>) -> SharedState {
        let notifier = BroadcastNotifier::new(16);
        let registry = InstallationRegistry::initialize(store, Arc::new(notifier.clone()));
        let loader = CatalogLoader::new(StaticCatalogSource::new(INDEX));
        let state = Arc::new(AppState::new(loader, registry, notifier));
        assert!(state.reload_catalog().await);
        state
    }

    pub fn slot(store: &MemoryStore) -> Option<String> {
        store.get(INSTALLED_APPS_KEY).unwrap()
    }
}

//! # Apps API
//!
//! Install, uninstall and the confirmation event stream.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream};
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use utoipa::ToSchema;

use storefront_core::Notification;

use super::ApiResponse;
use crate::state::SharedState;

#[derive(Debug, Serialize, ToSchema)]
pub struct InstalledResponse {
    pub apps: Vec<String>,
}

pub fn app_routes() -> Router<SharedState> {
    Router::new()
        .route("/installed", get(list_installed))
        .route("/apps/:name/install", post(install_app))
        .route("/apps/:name/uninstall", post(uninstall_app))
        .route("/events", get(events))
}

/// Names of installed apps, in installation order
#[utoipa::path(
    get,
    path = "/api/v1/installed",
    tag = "apps",
    responses(
        (status = 200, description = "Installed app names", body = InstalledResponse)
    )
)]
pub async fn list_installed(State(state): State<SharedState>) -> Json<InstalledResponse> {
    let mut registry = state.registry.lock().await;
    Json(InstalledResponse {
        apps: registry.refresh().names().to_vec(),
    })
}

/// Install an app from the catalog
#[utoipa::path(
    post,
    path = "/api/v1/apps/{name}/install",
    tag = "apps",
    params(("name" = String, Path, description = "App name")),
    responses(
        (status = 200, description = "App installed", body = ApiResponse),
        (status = 404, description = "App not in catalog", body = ApiResponse),
        (status = 500, description = "Installed set could not be saved", body = ApiResponse)
    )
)]
pub async fn install_app(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    let app = {
        let current = state.catalog.read().await;
        current.catalog().get(&name).cloned()
    };

    let Some(app) = app else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("{} is not in the catalog", name))),
        );
    };

    let mut registry = state.registry.lock().await;
    match registry.install(&app) {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::ok(Notification::installed(&app.name).message())),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

/// Uninstall an app. The app need not be in the current catalog.
#[utoipa::path(
    post,
    path = "/api/v1/apps/{name}/uninstall",
    tag = "apps",
    params(("name" = String, Path, description = "App name")),
    responses(
        (status = 200, description = "App uninstalled", body = ApiResponse),
        (status = 500, description = "Installed set could not be saved", body = ApiResponse)
    )
)]
pub async fn uninstall_app(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    let mut registry = state.registry.lock().await;
    match registry.uninstall(&name) {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::ok(Notification::uninstalled(&name).message())),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

/// SSE stream of install/uninstall confirmations with heartbeat
async fn events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.notifier.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        let next = tokio::time::timeout(std::time::Duration::from_secs(15), rx.recv()).await;

        match next {
            Ok(Ok(notification)) => {
                let json = serde_json::to_string(&notification).unwrap_or_default();
                Some((Ok(Event::default().event("notification").data(json)), rx))
            }
            Ok(Err(RecvError::Lagged(skipped))) => Some((
                Ok(Event::default().comment(format!("skipped {} notifications", skipped))),
                rx,
            )),
            Ok(Err(RecvError::Closed)) => None,
            Err(_) => Some((Ok(Event::default().comment("heartbeat")), rx)),
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{loaded_state, slot};
    use std::sync::Arc;
    use storefront_core::storage::INSTALLED_APPS_KEY;
    use storefront_core::{KeyValueStore, MemoryStore, NotificationKind};

    #[tokio::test]
    async fn test_install_then_uninstall() {
        let store = Arc::new(MemoryStore::new());
        let state = loaded_state(store.clone()).await;
        let mut rx = state.notifier.subscribe();

        let (status, Json(response)) =
            install_app(State(state.clone()), Path("Calculator".to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.message, "Calculator installed! Find it in Start Menu.");
        assert_eq!(slot(&store).as_deref(), Some(r#"["Calculator"]"#));

        let Json(installed) = list_installed(State(state.clone())).await;
        assert_eq!(installed.apps, vec!["Calculator"]);

        let (status, Json(response)) =
            uninstall_app(State(state.clone()), Path("Calculator".to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.message, "Calculator uninstalled.");
        assert_eq!(slot(&store).as_deref(), Some("[]"));

        assert_eq!(rx.recv().await.unwrap().kind, NotificationKind::Installed);
        assert_eq!(rx.recv().await.unwrap().kind, NotificationKind::Uninstalled);
    }

    #[tokio::test]
    async fn test_install_unknown_app_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let state = loaded_state(store.clone()).await;

        let (status, Json(response)) =
            install_app(State(state), Path("Solitaire".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!response.success);
        assert_eq!(slot(&store), None);
    }

    #[tokio::test]
    async fn test_uninstall_app_missing_from_catalog() {
        let store = Arc::new(MemoryStore::with_slot(
            INSTALLED_APPS_KEY,
            r#"["Retired App","Notepad"]"#,
        ));
        let state = loaded_state(store.clone()).await;

        let (status, _) = uninstall_app(State(state), Path("Retired App".to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(slot(&store).as_deref(), Some(r#"["Notepad"]"#));
    }

    #[tokio::test]
    async fn test_installed_picks_up_outside_writes() {
        let store = Arc::new(MemoryStore::new());
        let state = loaded_state(store.clone()).await;

        store.set(INSTALLED_APPS_KEY, r#"["Paint"]"#).unwrap();
        let Json(installed) = list_installed(State(state.clone())).await;
        assert_eq!(installed.apps, vec!["Paint"]);

        install_app(State(state.clone()), Path("Notepad".to_string())).await;
        assert_eq!(slot(&store).as_deref(), Some(r#"["Paint","Notepad"]"#));
    }
}

//! Shared server state

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use storefront_core::{BroadcastNotifier, CatalogLoader, CatalogState, InstallationRegistry};

pub struct AppState {
    pub catalog: RwLock<CatalogState>,
    pub loader: CatalogLoader,
    /// Single writer for the installed set
    pub registry: Mutex<InstallationRegistry>,
    pub notifier: BroadcastNotifier,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        loader: CatalogLoader,
        registry: InstallationRegistry,
        notifier: BroadcastNotifier,
    ) -> Self {
        Self {
            catalog: RwLock::new(CatalogState::new()),
            loader,
            registry: Mutex::new(registry),
            notifier,
        }
    }

    /// Fetch the catalog and apply it unless a newer load already landed.
    ///
    /// The catalog lock is not held while the fetch is in flight.
    pub async fn reload_catalog(&self) -> bool {
        let ticket = self.catalog.write().await.begin_load();
        let result = self.loader.load().await;
        self.catalog.write().await.finish_load(ticket, result)
    }
}

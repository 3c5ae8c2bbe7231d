//! # View Model
//!
//! What a catalog screen needs per app: the record, trimmed for display,
//! plus whether to offer Install or Uninstall.

use serde::Serialize;

use crate::catalog::{filter, AppRecord, Catalog};
use crate::registry::InstallationRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppCard {
    pub name: String,
    pub icon: String,
    pub description: String,
    pub features: Vec<String>,
    /// At most three gallery images
    pub gallery: Vec<String>,
    pub installed: bool,
}

impl AppCard {
    pub fn new(app: &AppRecord, installed: bool) -> Self {
        Self {
            name: app.name.clone(),
            icon: app.icon.clone(),
            description: app.description.clone(),
            features: app.features.clone(),
            gallery: app.gallery_preview().to_vec(),
            installed,
        }
    }
}

/// Filter the catalog by `query` and attach installation state
pub fn present(catalog: &Catalog, query: &str, registry: &InstallationRegistry) -> Vec<AppCard> {
    filter(catalog, query)
        .into_iter()
        .map(|app| AppCard::new(app, registry.is_installed(&app.name)))
        .collect()
}

//! # Configuration
//!
//! Settings persisted as `.storefront/config.json`. Every field is optional;
//! a missing or malformed file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::loader::{DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT_SECS};
use crate::catalog::{CatalogLoader, FileCatalogSource, HttpCatalogSource};
use crate::error::LoadError;
use crate::io::get_runtime_path;
use crate::storage::sqlite::DATABASE_FILE;

/// Config file name inside the runtime directory
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the catalog URL
pub const CATALOG_URL_ENV: &str = "STOREFRONT_CATALOG_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Store index endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_url: Option<String>,
    /// Local index document; takes precedence over `catalog_url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,
    /// SQLite database holding the installed set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl StorefrontConfig {
    pub fn default_path() -> PathBuf {
        get_runtime_path().join(CONFIG_FILE)
    }

    /// Load from the runtime directory and apply environment overrides
    pub async fn load() -> Self {
        let mut config = Self::load_from(Self::default_path()).await;
        config.apply_env_overrides();
        config
    }

    pub async fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }

        match tokio::fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Could not read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub async fn save(&self) -> Result<()> {
        self.save_to(Self::default_path()).await
    }

    pub async fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config: {:?}", path))
    }

    /// Overlay the fields set in `other`
    pub fn merge(&mut self, other: StorefrontConfig) {
        if other.catalog_url.is_some() {
            self.catalog_url = other.catalog_url;
        }
        if other.catalog_file.is_some() {
            self.catalog_file = other.catalog_file;
        }
        if other.database_path.is_some() {
            self.database_path = other.database_path;
        }
        if other.request_timeout_secs.is_some() {
            self.request_timeout_secs = other.request_timeout_secs;
        }
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(CATALOG_URL_ENV) {
            if !url.trim().is_empty() {
                self.catalog_url = Some(url);
            }
        }
    }

    pub fn catalog_url(&self) -> &str {
        self.catalog_url.as_deref().unwrap_or(DEFAULT_CATALOG_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| get_runtime_path().join(DATABASE_FILE))
    }

    /// Loader for the configured source
    pub fn catalog_loader(&self) -> Result<CatalogLoader, LoadError> {
        if let Some(path) = &self.catalog_file {
            return Ok(CatalogLoader::new(FileCatalogSource::new(path)));
        }
        let source = HttpCatalogSource::new(self.catalog_url(), self.request_timeout())?;
        Ok(CatalogLoader::new(source))
    }
}

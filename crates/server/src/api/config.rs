//! # Config API
//!
//! Read and patch `.storefront/config.json`. Changes take effect on restart.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

use storefront_core::StorefrontConfig;

use super::ApiResponse;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ConfigPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl From<&StorefrontConfig> for ConfigPayload {
    fn from(config: &StorefrontConfig) -> Self {
        Self {
            catalog_url: config.catalog_url.clone(),
            catalog_file: config
                .catalog_file
                .as_ref()
                .map(|p| p.display().to_string()),
            database_path: config
                .database_path
                .as_ref()
                .map(|p| p.display().to_string()),
            request_timeout_secs: config.request_timeout_secs,
        }
    }
}

impl From<ConfigPayload> for StorefrontConfig {
    fn from(payload: ConfigPayload) -> Self {
        Self {
            catalog_url: payload.catalog_url,
            catalog_file: payload.catalog_file.map(PathBuf::from),
            database_path: payload.database_path.map(PathBuf::from),
            request_timeout_secs: payload.request_timeout_secs,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigResponse {
    /// Values present in the config file
    pub config: ConfigPayload,
    /// Values in effect after defaults
    pub effective: ConfigPayload,
}

impl ConfigResponse {
    fn new(config: &StorefrontConfig) -> Self {
        Self {
            config: ConfigPayload::from(config),
            effective: ConfigPayload {
                catalog_url: Some(config.catalog_url().to_string()),
                catalog_file: config
                    .catalog_file
                    .as_ref()
                    .map(|p| p.display().to_string()),
                database_path: Some(config.database_path().display().to_string()),
                request_timeout_secs: Some(config.request_timeout().as_secs()),
            },
        }
    }
}

/// Get current configuration
#[utoipa::path(
    get,
    path = "/api/v1/config",
    tag = "config",
    responses(
        (status = 200, description = "Current configuration", body = ConfigResponse)
    )
)]
pub async fn get_config() -> Json<ConfigResponse> {
    let config = StorefrontConfig::load().await;
    Json(ConfigResponse::new(&config))
}

/// Update configuration (partial merge)
#[utoipa::path(
    patch,
    path = "/api/v1/config",
    tag = "config",
    request_body = ConfigPayload,
    responses(
        (status = 200, description = "Updated configuration", body = ConfigResponse),
        (status = 500, description = "Config file could not be written", body = ApiResponse)
    )
)]
pub async fn update_config(
    Json(updates): Json<ConfigPayload>,
) -> Result<Json<ConfigResponse>, (StatusCode, Json<ApiResponse>)> {
    match merge_into_file(StorefrontConfig::default_path(), updates).await {
        Ok(config) => Ok(Json(ConfigResponse::new(&config))),
        Err(e) => {
            tracing::warn!("Failed to save config: {:#}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Failed to save config: {}", e))),
            ))
        }
    }
}

/// Merge `updates` over the file at `path` and write it back
async fn merge_into_file(
    path: impl AsRef<Path>,
    updates: ConfigPayload,
) -> anyhow::Result<StorefrontConfig> {
    let path = path.as_ref();
    let mut config = StorefrontConfig::load_from(path).await;
    config.merge(updates.into());
    config.save_to(path).await?;
    Ok(config)
}

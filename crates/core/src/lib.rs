//! # Storefront Core
//!
//! State management for an app store: catalog loading, name search, and
//! install/uninstall tracking persisted in a local key-value store.
//!
//! ## Architecture
//!
//! - `catalog/` - Store index model, loader, reload state and search filter
//! - `registry` - InstallationRegistry, the owner of the installed set
//! - `storage/` - Key-value stores (in-memory, SQLite)
//! - `notify` - Install/uninstall confirmations
//! - `view` - Per-app display model combining catalog and registry
//! - `config` - `.storefront/config.json` settings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_core::catalog::filter;
//! use storefront_core::{InstallationRegistry, LogNotifier, SqliteStore, StorefrontConfig};
//!
//! let config = StorefrontConfig::load().await;
//! let catalog = config.catalog_loader()?.load().await.unwrap_or_default();
//! let store = Arc::new(SqliteStore::open_at(config.database_path())?);
//! let mut registry = InstallationRegistry::initialize(store, Arc::new(LogNotifier));
//!
//! if let Some(app) = filter(&catalog, "calc").first() {
//!     registry.install(app)?;
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod io;
pub mod notify;
pub mod registry;
pub mod storage;
pub mod view;

pub use catalog::{AppRecord, Catalog, CatalogLoader, CatalogState, LoadStatus};
pub use config::StorefrontConfig;
pub use error::{LoadError, RegistryError, StorageError};
pub use notify::{BroadcastNotifier, LogNotifier, Notification, NotificationKind, Notifier};
pub use registry::{InstallationRegistry, InstalledSet};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use view::{present, AppCard};

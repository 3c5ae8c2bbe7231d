//! # Catalog State
//!
//! Holds the current catalog across reloads. Each load is issued a ticket;
//! a response older than the last applied one is discarded.

use serde::Serialize;
use std::sync::Arc;

use super::model::Catalog;
use crate::error::LoadError;

/// Load lifecycle of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadStatus {
    /// No load has been issued yet
    #[default]
    Idle,
    /// A load is outstanding
    Loading,
    /// The last applied load succeeded
    Ready,
    /// The last applied load failed; the catalog is empty
    Failed(String),
}

/// Identifies one issued load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub struct CatalogState {
    catalog: Arc<Catalog>,
    status: LoadStatus,
    issued: u64,
    applied: u64,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current catalog. Cheap to clone and safe to hold across a reload.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    /// Register a new load and mark the catalog as loading
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.status = LoadStatus::Loading;
        LoadTicket(self.issued)
    }

    /// Apply the outcome of a load. Returns `false` if it was stale.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Catalog, LoadError>) -> bool {
        if ticket.0 <= self.applied {
            tracing::debug!(
                "Discarding stale catalog response (ticket {}, applied {})",
                ticket.0,
                self.applied
            );
            return false;
        }

        self.applied = ticket.0;
        let outstanding = self.issued > ticket.0;

        let status = match result {
            Ok(catalog) => {
                self.catalog = Arc::new(catalog);
                LoadStatus::Ready
            }
            Err(e) => {
                self.catalog = Arc::new(Catalog::empty());
                LoadStatus::Failed(e.to_string())
            }
        };

        self.status = if outstanding {
            LoadStatus::Loading
        } else {
            status
        };

        true
    }
}

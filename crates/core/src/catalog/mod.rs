//! # Catalog
//!
//! Store index loading, reload bookkeeping and name search.

pub mod filter;
pub mod loader;
pub mod model;
pub mod state;

pub use filter::{filter, FilteredView};
pub use loader::{
    CatalogLoader, CatalogSource, FileCatalogSource, HttpCatalogSource, StaticCatalogSource,
};
pub use model::{parse_catalog, AppRecord, Catalog, GALLERY_PREVIEW_LIMIT};
pub use state::{CatalogState, LoadStatus, LoadTicket};

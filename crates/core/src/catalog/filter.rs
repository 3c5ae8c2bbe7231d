//! # Search Filter
//!
//! Case-insensitive substring search over app names.

use super::model::{AppRecord, Catalog};

/// Apps matching a query, in catalog order
pub type FilteredView<'a> = Vec<&'a AppRecord>;

/// Return the apps whose name contains `query`, ignoring case.
///
/// Only `name` is searched. An empty query matches every app.
pub fn filter<'a>(catalog: &'a Catalog, query: &str) -> FilteredView<'a> {
    if query.is_empty() {
        return catalog.iter().collect();
    }

    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|app| app.name.to_lowercase().contains(&needle))
        .collect()
}

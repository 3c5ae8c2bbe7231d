//! # Storage
//!
//! An opaque string key-value store, the durable home of the installed set.
//!
//! - `memory` - process-local map, for tests and ephemeral sessions
//! - `sqlite` - `.storefront/storefront.db`, survives restarts

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StorageError;

/// Key of the slot holding the JSON array of installed app names
pub const INSTALLED_APPS_KEY: &str = "installedApps";

/// Computes the next value of a slot from its current value
pub type SlotUpdate<'a> = dyn FnMut(Option<&str>) -> Result<String, StorageError> + 'a;

/// Durable get/set of string values.
///
/// `set` and `update` must not return until the value is durable to the
/// extent the backend allows.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read-modify-write of one slot, atomic with respect to every other
    /// writer of the same backing store, including other processes.
    ///
    /// Returns the value written. If `apply` fails nothing is written.
    fn update(&self, key: &str, apply: &mut SlotUpdate<'_>) -> Result<String, StorageError>;
}

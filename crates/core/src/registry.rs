//! # Installation Registry
//!
//! Owns the set of installed app names and keeps it in step with one slot
//! of a [`KeyValueStore`]. "Installed" is only a membership flag.
//!
//! Every mutation is a read-modify-write of the persisted slot, applied
//! before the in-memory set changes, so when `install`/`uninstall` returns
//! the two are identical. Registries sharing one database never overwrite
//! each other's changes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::AppRecord;
use crate::error::RegistryError;
use crate::notify::{Notification, Notifier};
use crate::storage::{KeyValueStore, INSTALLED_APPS_KEY};

/// Installed app names, duplicate-free, in installation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstalledSet {
    names: Vec<String>,
}

impl InstalledSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list that may contain duplicates; first occurrence wins
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for name in names {
            let name = name.into();
            if !set.contains(&name) {
                set.names.push(name);
            }
        }
        set
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn with(&self, name: &str) -> Self {
        let mut next = self.clone();
        if !next.contains(name) {
            next.names.push(name.to_string());
        }
        next
    }

    fn without(&self, name: &str) -> Self {
        Self {
            names: self.names.iter().filter(|n| *n != name).cloned().collect(),
        }
    }

    /// Compact JSON array, the persisted form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.names)
    }

    /// Parse the persisted form. Anything but an array of strings is `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Vec<String>>(raw)
            .ok()
            .map(Self::from_names)
    }
}

/// Session-scoped owner of installation state
pub struct InstallationRegistry {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    key: String,
    installed: InstalledSet,
}

impl InstallationRegistry {
    /// Read the persisted slot once and build the registry.
    ///
    /// An absent, unreadable or malformed slot yields an empty set.
    pub fn initialize(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::initialize_with_key(store, notifier, INSTALLED_APPS_KEY)
    }

    /// Like [`initialize`](Self::initialize) with a non-default slot key
    pub fn initialize_with_key(
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        key: &str,
    ) -> Self {
        let installed = read_slot(store.as_ref(), key);
        tracing::debug!("Installation registry loaded {} apps", installed.len());

        Self {
            store,
            notifier,
            key: key.to_string(),
            installed,
        }
    }

    pub fn installed(&self) -> &InstalledSet {
        &self.installed
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains(name)
    }

    /// Re-read the persisted slot, picking up writes made by other
    /// registries on the same store.
    pub fn refresh(&mut self) -> &InstalledSet {
        self.installed = read_slot(self.store.as_ref(), &self.key);
        &self.installed
    }

    /// Mark an app installed. Installing an installed app changes nothing.
    pub fn install(&mut self, app: &AppRecord) -> Result<&InstalledSet, RegistryError> {
        self.commit(|current| current.with(&app.name))?;
        self.notifier.notify(&Notification::installed(&app.name));
        Ok(&self.installed)
    }

    /// Unmark an app. Removing an absent name is a no-op.
    pub fn uninstall(&mut self, name: &str) -> Result<&InstalledSet, RegistryError> {
        self.commit(|current| current.without(name))?;
        self.notifier.notify(&Notification::uninstalled(name));
        Ok(&self.installed)
    }

    /// Apply `change` to the persisted set in one atomic store update, then
    /// adopt the result. On failure the current set is kept.
    fn commit(
        &mut self,
        change: impl Fn(&InstalledSet) -> InstalledSet,
    ) -> Result<(), RegistryError> {
        let key = self.key.as_str();
        let mut next = InstalledSet::new();

        let written = self.store.update(key, &mut |current| {
            let base = current
                .map(|raw| parse_slot(raw, key))
                .unwrap_or_default();
            next = change(&base);
            Ok(next.to_json()?)
        });

        if let Err(e) = written {
            tracing::warn!(
                "Failed to persist installed apps, keeping previous state: {}",
                e
            );
            return Err(e.into());
        }

        self.installed = next;
        Ok(())
    }
}

fn read_slot(store: &dyn KeyValueStore, key: &str) -> InstalledSet {
    match store.get(key) {
        Ok(Some(raw)) => parse_slot(&raw, key),
        Ok(None) => InstalledSet::new(),
        Err(e) => {
            tracing::warn!("Could not read '{}', starting empty: {}", key, e);
            InstalledSet::new()
        }
    }
}

fn parse_slot(raw: &str, key: &str) -> InstalledSet {
    InstalledSet::from_json(raw).unwrap_or_else(|| {
        tracing::warn!("Slot '{}' is malformed, starting empty", key);
        InstalledSet::new()
    })
}

//! # Catalog Model
//!
//! App records as held in memory, and the wire shape of the store index
//! document they are parsed from.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Number of gallery images shown for an app
pub const GALLERY_PREVIEW_LIMIT: usize = 3;

/// One element of the store index document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppEntry {
    pub name: String,
    pub icon: String,
    pub data: AppEntryData,
}

/// The `data` object of an index entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppEntryData {
    /// Short description
    pub desc: String,
    /// Newline-separated feature list
    pub feat: String,
    /// Screenshot URLs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<String>>,
}

/// An installable application. Identity is `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub name: String,
    pub icon: String,
    pub description: String,
    pub features: Vec<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
}

impl AppRecord {
    /// Gallery images to display, at most [`GALLERY_PREVIEW_LIMIT`]
    pub fn gallery_preview(&self) -> &[String] {
        let end = self.gallery.len().min(GALLERY_PREVIEW_LIMIT);
        &self.gallery[..end]
    }
}

impl From<AppEntry> for AppRecord {
    fn from(entry: AppEntry) -> Self {
        Self {
            name: entry.name,
            icon: entry.icon,
            description: entry.data.desc,
            features: split_features(&entry.data.feat),
            gallery: entry.data.gallery.unwrap_or_default(),
        }
    }
}

/// Split a newline-separated feature list, dropping empty lines
pub fn split_features(feat: &str) -> Vec<String> {
    feat.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// The ordered list of all known apps. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    apps: Vec<AppRecord>,
}

impl Catalog {
    pub fn new(apps: Vec<AppRecord>) -> Self {
        Self { apps }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AppRecord> {
        self.apps.iter()
    }

    pub fn apps(&self) -> &[AppRecord] {
        &self.apps
    }

    /// First record with exactly this name
    pub fn get(&self, name: &str) -> Option<&AppRecord> {
        self.apps.iter().find(|app| app.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.apps.iter().map(|app| app.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a AppRecord;
    type IntoIter = std::slice::Iter<'a, AppRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.apps.iter()
    }
}

/// Parse a store index document, preserving element order
pub fn parse_catalog(body: &str) -> Result<Catalog, LoadError> {
    let entries: Vec<AppEntry> = serde_json::from_str(body)?;
    Ok(Catalog::new(entries.into_iter().map(AppRecord::from).collect()))
}

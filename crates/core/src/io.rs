//! # IO Utilities
//!
//! Location of the `.storefront` runtime directory.

use std::path::PathBuf;

/// Environment variable overriding the runtime directory
pub const RUNTIME_PATH_ENV: &str = "STOREFRONT_RUNTIME_PATH";

/// Runtime directory holding the config file and the database.
///
/// `STOREFRONT_RUNTIME_PATH` wins; otherwise `.storefront` under the
/// working directory.
pub fn get_runtime_path() -> PathBuf {
    if let Ok(path) = std::env::var(RUNTIME_PATH_ENV) {
        return PathBuf::from(path);
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".storefront")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_runtime_path() {
        if std::env::var(RUNTIME_PATH_ENV).is_err() {
            assert!(get_runtime_path().ends_with(".storefront"));
        }
    }
}

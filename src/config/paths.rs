//! Path resolution for sakani configuration and data files.
//!
//! All sakani data is stored in `~/.sakani/` unless `SAKANI_HOME` or
//! `--root` points elsewhere:
//! - `config.yaml` - Main configuration file
//! - `sakani.db` - `SQLite` key/value store holding the offline queue

use std::path::PathBuf;

use crate::error::SakaniError;

/// Environment variable that overrides the data root.
pub const ROOT_ENV: &str = "SAKANI_HOME";

/// Paths to sakani configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.sakani/`
    pub root: PathBuf,
    /// Config file: `~/.sakani/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.sakani/sakani.db`
    pub database: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SakaniError> {
        let home = std::env::var("HOME").map_err(|_| {
            SakaniError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".sakani")))
    }

    /// Resolve paths from an explicit root, falling back to the home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no root is given and the home directory cannot be
    /// determined.
    pub fn resolve(root: Option<PathBuf>) -> Result<Self, SakaniError> {
        root.map_or_else(Self::new, |root| Ok(Self::with_root(root)))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("sakani.db"),
            root,
        }
    }

    /// Ensure the root directory exists, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), SakaniError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                SakaniError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-sakani");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
        assert_eq!(paths.database, root.join("sakani.db"));
    }

    #[test]
    fn test_resolve_prefers_explicit_root() {
        let root = PathBuf::from("/tmp/explicit-root");
        let paths = Paths::resolve(Some(root.clone())).unwrap();
        assert_eq!(paths.root, root);
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("nested").join("root"));

        paths.ensure_dirs().unwrap();

        assert!(paths.root.exists());
    }
}

//! The operating system surface attachment needs.

use std::path::{Path, PathBuf};

use luaf_errors::AttachError;

/// Loader and process queries used by [`Bootstrap`](crate::Bootstrap).
///
/// Implementations must never panic; every failure comes back as an
/// [`AttachError`] and the bootstrap decides whether it is fatal.
#[cfg_attr(test, mockall::automock)]
pub trait Platform {
    /// Path of the executable the current process was started from.
    fn current_exe(&self) -> Result<PathBuf, AttachError>;

    /// Paths of every module currently mapped into the process.
    fn loaded_modules(&self) -> Result<Vec<PathBuf>, AttachError>;

    /// Resolve a relative search directory to an absolute one.
    fn resolve_dir(&self, dir: &Path) -> Result<PathBuf, AttachError> {
        resolve_search_dir(dir)
    }

    /// Add an absolute directory to the loader's search order, restricted to
    /// the default system directories plus the added ones.
    fn add_search_dir(&self, dir: &Path) -> Result<(), AttachError>;

    /// Load a module by file name and keep it mapped for the life of the
    /// process.
    fn load_module(&self, name: &str) -> Result<(), AttachError>;

    /// Show one modal error diagnostic.
    fn show_error(&self, title: &str, message: &str);
}

/// Resolve `dir` against the working directory. The directory must exist.
///
/// # Errors
///
/// [`AttachError::SearchPath`] if the directory is missing or the working
/// directory cannot be read.
pub fn resolve_search_dir(dir: &Path) -> Result<PathBuf, AttachError> {
    if !dir.is_dir() {
        return Err(AttachError::search_path(dir, "directory not found"));
    }
    std::path::absolute(dir).map_err(|e| AttachError::search_path(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use luaf_test_helpers::must;

    #[test]
    fn test_missing_dir_is_an_error() {
        let temp = must(tempfile::tempdir());
        let missing = temp.path().join("lua_framework").join("bin");
        let err = resolve_search_dir(&missing);
        assert!(matches!(err, Err(AttachError::SearchPath { .. })));
    }

    #[test]
    fn test_existing_dir_resolves_absolute() {
        let temp = must(tempfile::tempdir());
        let bin = temp.path().join("bin");
        must(std::fs::create_dir(&bin));
        let resolved = must(resolve_search_dir(&bin));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("bin"));
    }

    #[test]
    fn test_file_is_not_a_search_dir() {
        let temp = must(tempfile::NamedTempFile::new());
        assert!(matches!(resolve_search_dir(temp.path()), Err(_)));
    }
}

//! Unix loader platform.
//!
//! There is no per-process library search order to extend, so added
//! directories are kept here and tried in order before the plain name.

#![expect(unsafe_code, reason = "dynamic loader calls")]

use std::ffi::{CStr, OsStr, c_int, c_void};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_NOW};
use luaf_errors::AttachError;
use parking_lot::Mutex;
use tracing::error;

use crate::platform::Platform;

/// The dynamic loader.
#[derive(Debug, Default)]
pub struct UnixPlatform {
    search_dirs: Mutex<Vec<PathBuf>>,
}

impl UnixPlatform {
    /// Directories added so far, in search order.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        self.search_dirs.lock().clone()
    }

    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> =
            self.search_dirs.lock().iter().map(|dir| dir.join(name)).collect();
        candidates.push(PathBuf::from(name));
        candidates
    }
}

#[cfg(not(target_vendor = "apple"))]
unsafe extern "C" fn collect_module(
    info: *mut libc::dl_phdr_info,
    _size: libc::size_t,
    data: *mut c_void,
) -> c_int {
    // SAFETY: `data` is the vector handed to `dl_iterate_phdr` below, which
    // is not otherwise borrowed during the iteration.
    let modules = unsafe { &mut *data.cast::<Vec<PathBuf>>() };
    // SAFETY: the loader passes a valid record for the duration of the call.
    let name = unsafe { (*info).dlpi_name };
    if !name.is_null() {
        // SAFETY: `dlpi_name` is a NUL-terminated string owned by the loader.
        let name = unsafe { CStr::from_ptr(name) };
        if !name.is_empty() {
            modules.push(PathBuf::from(OsStr::from_bytes(name.to_bytes())));
        }
    }
    0
}

impl Platform for UnixPlatform {
    fn current_exe(&self) -> Result<PathBuf, AttachError> {
        std::env::current_exe().map_err(AttachError::ExecutablePath)
    }

    #[cfg(not(target_vendor = "apple"))]
    fn loaded_modules(&self) -> Result<Vec<PathBuf>, AttachError> {
        let mut modules: Vec<PathBuf> = Vec::new();
        // SAFETY: the callback only touches `modules`, which outlives the
        // iteration.
        unsafe {
            libc::dl_iterate_phdr(
                Some(collect_module),
                std::ptr::from_mut(&mut modules).cast::<c_void>(),
            );
        }
        Ok(modules)
    }

    #[cfg(target_vendor = "apple")]
    fn loaded_modules(&self) -> Result<Vec<PathBuf>, AttachError> {
        Err(AttachError::ModuleEnumeration(
            "module enumeration is not supported on this platform".to_string(),
        ))
    }

    fn add_search_dir(&self, dir: &Path) -> Result<(), AttachError> {
        if !dir.is_absolute() {
            return Err(AttachError::search_path(dir, "path is not absolute"));
        }
        let mut dirs = self.search_dirs.lock();
        if !dirs.iter().any(|existing| existing == dir) {
            dirs.push(dir.to_path_buf());
        }
        Ok(())
    }

    fn load_module(&self, name: &str) -> Result<(), AttachError> {
        let mut last_error = None;
        for candidate in self.candidates(name) {
            // SAFETY: the core module's initializers are trusted to be sound.
            match unsafe { Library::open(Some(&candidate), RTLD_NOW | RTLD_GLOBAL) } {
                Ok(library) => {
                    // Mapped until process exit.
                    let _handle = library.into_raw();
                    return Ok(());
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(AttachError::core_load(
            name,
            last_error.map_or_else(|| "no candidates".to_string(), |e| e.to_string()),
        ))
    }

    fn show_error(&self, title: &str, message: &str) {
        error!(title, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luaf_test_helpers::must;

    #[test]
    fn test_search_dirs_are_tried_first() {
        let platform = UnixPlatform::default();
        must(platform.add_search_dir(Path::new("/opt/game/lua_framework/bin")));
        must(platform.add_search_dir(Path::new("/opt/game/lua_framework/bin")));
        assert_eq!(
            platform.candidates("lua_framework.so"),
            vec![
                PathBuf::from("/opt/game/lua_framework/bin/lua_framework.so"),
                PathBuf::from("lua_framework.so"),
            ]
        );
    }

    #[test]
    fn test_relative_search_dir_is_rejected() {
        let platform = UnixPlatform::default();
        assert!(matches!(platform.add_search_dir(Path::new("lua_framework/bin")), Err(_)));
        assert!(platform.search_dirs().is_empty());
    }

    #[test]
    fn test_missing_module_is_a_core_load_error() {
        let platform = UnixPlatform::default();
        let err = platform.load_module("luaf-definitely-missing.so");
        assert!(matches!(err, Err(AttachError::CoreLoad { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_enumerates_libc() {
        let platform = UnixPlatform::default();
        let modules = must(platform.loaded_modules());
        assert!(
            modules.iter().any(|m| m.to_string_lossy().contains("libc")),
            "{modules:?}"
        );
    }
}

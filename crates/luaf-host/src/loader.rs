//! Extension discovery and initialization.
//!
//! Every platform library in the extension directory is loaded and its entry
//! point called with the second generation table. `ExtInitializeVersioned` is
//! preferred; when it answers `ABI_MISMATCH` the first generation envelope is
//! offered instead. Libraries stay mapped for the rest of the process.

#![expect(unsafe_code, reason = "maps extension libraries and calls their entry points")]

use std::fmt;
use std::path::{Path, PathBuf};

use libloading::Library;
use luaf_abi::{VersionedTable, entry_point, gen2, return_code};
use luaf_errors::{ErrorSeverity, HostError};

use crate::host::CoreHost;

/// `ExtInitializeVersioned(envelope) -> code`
pub type VersionedInitFn = unsafe extern "C" fn(*const VersionedTable) -> i32;
/// `ExtInitialize(table) -> code`
pub type LegacyInitFn = unsafe extern "C" fn(*const gen2::CoreApiParam) -> i32;

/// Outcome of one directory scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Libraries found
    pub total: usize,
    /// Libraries that loaded and initialized
    pub loaded: usize,
}

impl LoadSummary {
    /// Libraries that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total.saturating_sub(self.loaded)
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} extensions loaded", self.loaded, self.total)
    }
}

/// Which entry point initialized an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// `ExtInitializeVersioned` accepted this table generation.
    Versioned {
        /// Generation accepted
        generation: u32,
    },
    /// `ExtInitialize` with the second generation table.
    Legacy,
    /// The library exports neither entry point.
    Missing,
}

/// A library that loaded and initialized.
pub struct LoadedExtension {
    name: String,
    path: PathBuf,
    entry: EntryKind,
    _library: Library,
}

impl fmt::Debug for LoadedExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedExtension")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

impl LoadedExtension {
    /// File stem of the library.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry point used.
    #[must_use]
    pub fn entry(&self) -> EntryKind {
        self.entry
    }
}

/// Whether `path` names a loadable library on this platform.
#[must_use]
pub fn is_library(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(std::env::consts::DLL_EXTENSION))
}

fn extension_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Scans one directory on behalf of a host.
#[derive(Debug)]
pub struct ExtensionLoader<'h> {
    host: &'h CoreHost,
    dir: PathBuf,
}

impl<'h> ExtensionLoader<'h> {
    /// Loader for `dir`.
    pub fn new(host: &'h CoreHost, dir: impl Into<PathBuf>) -> Self {
        Self {
            host,
            dir: dir.into(),
        }
    }

    /// Directory scanned.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Library files in the directory, sorted by path.
    ///
    /// # Errors
    ///
    /// [`HostError::ExtensionDir`] when the directory cannot be read.
    pub fn discover(&self) -> Result<Vec<PathBuf>, HostError> {
        let dir_error = |source| HostError::ExtensionDir {
            path: self.dir.clone(),
            source,
        };
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(dir_error)? {
            let path = entry.map_err(dir_error)?.path();
            if path.is_file() && is_library(&path) {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }

    /// Load and initialize every library found.
    ///
    /// A missing directory is not an error and yields an empty summary.
    ///
    /// # Errors
    ///
    /// [`HostError::ExtensionDir`] when the directory exists but cannot be
    /// read.
    pub fn load_all(&self) -> Result<LoadSummary, HostError> {
        if !self.dir.exists() {
            tracing::info!(dir = %self.dir.display(), "extension directory not found, skipping");
            return Ok(LoadSummary::default());
        }

        let mut summary = LoadSummary::default();
        for path in self.discover()? {
            let outcome = self.load_one(&path);
            self.record(&mut summary, &path, outcome);
        }

        tracing::info!(total = summary.total, loaded = summary.loaded, "extension scan finished");
        Ok(summary)
    }

    /// Load and initialize one library.
    ///
    /// # Errors
    ///
    /// - [`HostError::ExtensionLoad`] when the library cannot be mapped.
    /// - [`HostError::ExtensionInit`] when its entry point returns non-zero.
    pub fn load_one(&self, path: &Path) -> Result<LoadedExtension, HostError> {
        tracing::info!(file = %path.display(), "loading extension");

        // SAFETY: loading runs the library's initializers; extensions are
        // trusted code placed next to the game by the user.
        let library = unsafe { Library::new(path) }.map_err(|e| HostError::ExtensionLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.adopt(library, path)
    }

    fn adopt(&self, library: Library, path: &Path) -> Result<LoadedExtension, HostError> {
        let name = extension_name(path);
        let entry_points = EntryPoints::resolve(&library);
        // SAFETY: symbols resolved by their exported names carry the entry
        // point signatures.
        let entry = unsafe { self.initialize(entry_points, &name, path) }?;
        Ok(LoadedExtension {
            name,
            path: path.to_path_buf(),
            entry,
            _library: library,
        })
    }

    fn record(&self, summary: &mut LoadSummary, path: &Path, outcome: Result<LoadedExtension, HostError>) {
        summary.total += 1;
        match outcome {
            Ok(extension) => {
                tracing::info!(name = extension.name(), entry = ?extension.entry(), "extension loaded");
                self.host.add_extension(extension);
                summary.loaded += 1;
            }
            Err(err) => report(&extension_name(path), &err, "failed to load extension"),
        }
    }

    /// Run the entry points of one extension against this loader's host.
    ///
    /// The versioned entry is offered the second generation envelope, then
    /// the first when it answers `ABI_MISMATCH`. Without it the legacy entry
    /// receives the second generation table. A library exporting neither is
    /// reported and still counts as initialized.
    ///
    /// # Safety
    ///
    /// Each present entry point must follow the extension entry point
    /// contract: it is called with process-lifetime tables and may keep them.
    ///
    /// # Errors
    ///
    /// [`HostError::ExtensionInit`] with the first non-zero code other than a
    /// declined generation, or `ABI_MISMATCH` when every generation was
    /// declined.
    pub unsafe fn initialize(
        &self,
        entry_points: EntryPoints,
        name: &str,
        path: &Path,
    ) -> Result<EntryKind, HostError> {
        let failed = |code| HostError::ExtensionInit {
            name: name.to_string(),
            code,
        };

        if let Some(init) = entry_points.versioned {
            for envelope in [self.host.envelope_v2(), self.host.envelope_v1()] {
                // SAFETY: the envelope and its table are process statics.
                let code = unsafe { init(envelope) };
                match code {
                    return_code::SUCCESS => {
                        return Ok(EntryKind::Versioned {
                            generation: envelope.header.generation,
                        });
                    }
                    return_code::ABI_MISMATCH => {
                        tracing::debug!(name, generation = envelope.header.generation, "extension declined table generation");
                    }
                    code => return Err(failed(code)),
                }
            }
            return Err(failed(return_code::ABI_MISMATCH));
        }

        if let Some(init) = entry_points.legacy {
            // SAFETY: the table is a process static.
            let code = unsafe { init(self.host.table_v2()) };
            return match code {
                return_code::SUCCESS => Ok(EntryKind::Legacy),
                code => Err(failed(code)),
            };
        }

        let missing = HostError::MissingEntryPoint {
            path: path.to_path_buf(),
        };
        report(name, &missing, "is it a valid extension?");
        Ok(EntryKind::Missing)
    }
}

/// Entry points exported by one library.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryPoints {
    /// `ExtInitializeVersioned`, when exported.
    pub versioned: Option<VersionedInitFn>,
    /// `ExtInitialize`, when exported.
    pub legacy: Option<LegacyInitFn>,
}

impl EntryPoints {
    fn resolve(library: &Library) -> Self {
        // SAFETY: the exported symbols have these signatures by the extension
        // entry point contract; they are only called through `initialize`.
        let versioned = unsafe { library.get::<VersionedInitFn>(entry_point::VERSIONED_SYMBOL) };
        // SAFETY: as above, for `LegacyInitFn`.
        let legacy = unsafe { library.get::<LegacyInitFn>(entry_point::LEGACY_SYMBOL) };
        Self {
            versioned: versioned.ok().map(|symbol| *symbol),
            legacy: legacy.ok().map(|symbol| *symbol),
        }
    }
}

/// Log `err` at the level its severity calls for.
fn report(name: &str, err: &HostError, message: &str) {
    match err.severity() {
        ErrorSeverity::Info => tracing::info!(name, error = %err, "{message}"),
        ErrorSeverity::Warning => tracing::warn!(name, error = %err, "{message}"),
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            tracing::error!(name, error = %err, "{message}");
        }
    }
}

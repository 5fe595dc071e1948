//! Shared function namespace.

#![expect(unsafe_code, reason = "typed lookups transmute registered addresses")]

use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr::NonNull;

use luaf_abi::FunctionSignature;
use luaf_errors::HostError;
use parking_lot::RwLock;

/// Signature recorded for entries registered through the C table.
pub const UNTYPED: &str = "<untyped>";

/// One registered function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionEntry {
    address: usize,
    signature: Option<&'static str>,
}

impl FunctionEntry {
    /// Function address.
    #[must_use]
    pub fn address(&self) -> usize {
        self.address
    }

    /// Signature recorded at registration, `None` for untyped entries.
    #[must_use]
    pub fn signature(&self) -> Option<&'static str> {
        self.signature
    }

    /// Address as a pointer, `None` for a null registration.
    #[must_use]
    pub fn as_ptr(&self) -> Option<NonNull<c_void>> {
        NonNull::new(self.address as *mut c_void)
    }
}

/// Name to function map shared by the core and every extension.
///
/// Registrations are serialized by an `RwLock`; the last registration under a
/// name wins.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    entries: RwLock<HashMap<String, FunctionEntry>>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, name: &str, entry: FunctionEntry) {
        let previous = self.entries.write().insert(name.to_string(), entry);
        match previous {
            Some(old) if old.address != entry.address => {
                tracing::warn!(
                    name,
                    old = format_args!("{:#x}", old.address),
                    new = format_args!("{:#x}", entry.address),
                    "function registration replaced"
                );
            }
            _ => tracing::debug!(name, "function registered"),
        }
    }

    /// Register an untyped function pointer, as received through the table.
    pub fn register(&self, name: &str, func: *const c_void) {
        self.insert(
            name,
            FunctionEntry {
                address: func as usize,
                signature: None,
            },
        );
    }

    /// Register a function together with its signature.
    pub fn register_typed<F: FunctionSignature>(&self, name: &str, func: F) {
        self.insert(
            name,
            FunctionEntry {
                address: func.into_raw() as usize,
                signature: Some(F::signature()),
            },
        );
    }

    /// Look up an entry.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<FunctionEntry> {
        self.entries.read().get(name).copied()
    }

    /// Look up a function pointer. Null registrations read as absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<NonNull<c_void>> {
        self.entry(name).and_then(|entry| entry.as_ptr())
    }

    /// Look up a function registered with [`register_typed`](Self::register_typed).
    ///
    /// # Errors
    ///
    /// [`HostError::SignatureMismatch`] when the entry was registered untyped
    /// or with a different signature.
    pub fn get_typed<F: FunctionSignature>(&self, name: &str) -> Result<Option<F>, HostError> {
        let Some(entry) = self.entry(name) else {
            return Ok(None);
        };
        let requested = F::signature();
        match entry.signature {
            Some(registered) if registered == requested => {}
            registered => {
                return Err(HostError::SignatureMismatch {
                    name: name.to_string(),
                    registered: registered.unwrap_or(UNTYPED),
                    requested,
                });
            }
        }
        let Some(ptr) = entry.as_ptr() else {
            return Ok(None);
        };
        // SAFETY: the entry was registered from an `F` under the same
        // signature string.
        Ok(Some(unsafe { F::from_raw(ptr.as_ptr().cast_const()) }))
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }
}

//! Host singleton directory.

use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr::NonNull;

use parking_lot::RwLock;

/// Name to object pointer lookup, fed by the core as it discovers the host's
/// singletons.
#[derive(Debug, Default)]
pub struct SingletonDirectory {
    entries: RwLock<HashMap<String, usize>>,
}

impl SingletonDirectory {
    /// Empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` at `ptr`. Null removes the entry.
    pub fn insert(&self, name: impl Into<String>, ptr: *mut c_void) {
        let name = name.into();
        if ptr.is_null() {
            self.entries.write().remove(&name);
            return;
        }
        tracing::trace!(name = %name, ptr = ?ptr, "singleton recorded");
        self.entries.write().insert(name, ptr as usize);
    }

    /// Pointer recorded under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<NonNull<c_void>> {
        self.entries
            .read()
            .get(name)
            .and_then(|addr| NonNull::new(*addr as *mut c_void))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let dir = SingletonDirectory::new();
        dir.insert("sMhKeyboard", 0x4000 as *mut c_void);
        assert_eq!(dir.get("sMhKeyboard").map(|p| p.as_ptr() as usize), Some(0x4000));
        assert!(dir.get("sMhSteamController").is_none());

        dir.insert("sMhKeyboard", std::ptr::null_mut());
        assert!(dir.is_empty());
    }
}

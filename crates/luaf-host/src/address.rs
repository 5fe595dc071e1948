//! Managed addresses: named byte patterns resolved against the host image.

#![expect(unsafe_code, reason = "scans the host image in place")]

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use luaf_errors::HostError;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

/// A byte pattern such as `"48 8B ?? 05"`. `??` and `?` match any byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    bytes: Vec<Option<u8>>,
}

impl Pattern {
    /// Parse the space separated hex form.
    ///
    /// # Errors
    ///
    /// [`HostError::InvalidPattern`] for an empty pattern, a token that is not
    /// a hex byte, or a pattern of wildcards only.
    pub fn parse(text: &str) -> Result<Self, HostError> {
        let invalid = |reason: String| HostError::InvalidPattern {
            pattern: text.to_string(),
            reason,
        };

        let mut bytes = Vec::new();
        for token in text.split_whitespace() {
            match token {
                "?" | "??" => bytes.push(None),
                hex if hex.len() == 2 && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                    let byte = u8::from_str_radix(hex, 16)
                        .map_err(|e| invalid(format!("bad byte {hex:?}: {e}")))?;
                    bytes.push(Some(byte));
                }
                other => return Err(invalid(format!("bad token {other:?}"))),
            }
        }

        if bytes.is_empty() {
            return Err(invalid("pattern is empty".to_string()));
        }
        if bytes.iter().all(Option::is_none) {
            return Err(invalid("pattern has no fixed bytes".to_string()));
        }
        Ok(Self { bytes })
    }

    /// Number of bytes matched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; parsing rejects empty patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the pattern matches at the start of `window`.
    #[must_use]
    pub fn matches(&self, window: &[u8]) -> bool {
        window.len() >= self.bytes.len()
            && self
                .bytes
                .iter()
                .zip(window)
                .all(|(want, have)| want.is_none_or(|b| b == *have))
    }

    /// Offset of the first match in `haystack`.
    #[must_use]
    pub fn find(&self, haystack: &[u8]) -> Option<usize> {
        haystack
            .windows(self.bytes.len())
            .position(|window| self.matches(window))
    }
}

impl FromStr for Pattern {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match byte {
                Some(b) => write!(f, "{b:02X}")?,
                None => f.write_str("??")?,
            }
        }
        Ok(())
    }
}

/// A named pattern and the offset from its match to the wanted address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Record name
    pub name: String,
    /// Pattern text
    pub pattern: String,
    /// Offset from the start of the match
    pub offset: isize,
}

/// Finds patterns in the host's memory.
pub trait AddressResolver: Send + Sync {
    /// Absolute address of the first match.
    fn find(&self, pattern: &Pattern) -> Option<usize>;
}

/// Resolver over one contiguous memory region.
#[derive(Debug, Clone, Copy)]
pub struct RegionResolver {
    base: usize,
    bytes: &'static [u8],
}

impl RegionResolver {
    /// Scan `bytes`, reporting matches relative to the address of its first
    /// byte.
    #[must_use]
    pub fn new(bytes: &'static [u8]) -> Self {
        Self {
            base: bytes.as_ptr() as usize,
            bytes,
        }
    }

    /// Scan `len` bytes starting at `base`.
    ///
    /// # Safety
    ///
    /// The whole range must be mapped, readable and unchanging for the rest of
    /// the process.
    #[must_use]
    pub unsafe fn from_raw(base: *const u8, len: usize) -> Self {
        // SAFETY: forwarded caller contract.
        Self::new(unsafe { std::slice::from_raw_parts(base, len) })
    }
}

impl AddressResolver for RegionResolver {
    fn find(&self, pattern: &Pattern) -> Option<usize> {
        pattern
            .find(self.bytes)
            .and_then(|offset| self.base.checked_add(offset))
    }
}

#[derive(Debug)]
struct Entry {
    record: AddressRecord,
    pattern: Pattern,
    /// Bumped on every replacement; a scan only caches its result when the
    /// generation it started from is still current.
    generation: u64,
}

/// Managed address records plus the addresses resolved from them.
///
/// Resolution is lazy and cached; replacing a record drops its cached
/// address. Lock order is `entries` before `resolved`.
#[derive(Default)]
pub struct AddressBook {
    entries: Mutex<HashMap<String, Entry>>,
    resolved: Mutex<HashMap<String, usize>>,
    resolver: RwLock<Option<Box<dyn AddressResolver>>>,
}

impl fmt::Debug for AddressBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressBook")
            .field("records", &self.entries.lock().len())
            .field("resolved", &self.resolved.lock().len())
            .field("has_resolver", &self.resolver.read().is_some())
            .finish()
    }
}

impl AddressBook {
    /// Empty book without a resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the resolver used for uncached lookups.
    pub fn set_resolver(&self, resolver: impl AddressResolver + 'static) {
        *self.resolver.write() = Some(Box::new(resolver));
    }

    /// Add or replace a record.
    ///
    /// # Errors
    ///
    /// [`HostError::InvalidPattern`] when the pattern does not parse; the
    /// book is left unchanged.
    pub fn set_record(&self, record: AddressRecord) -> Result<(), HostError> {
        let pattern = Pattern::parse(&record.pattern)?;
        let name = record.name.clone();
        let mut entries = self.entries.lock();
        let generation = entries
            .get(&name)
            .map_or(0, |previous| previous.generation.wrapping_add(1));
        let previous = entries.insert(
            name.clone(),
            Entry {
                record,
                pattern,
                generation,
            },
        );
        self.resolved.lock().remove(&name);
        drop(entries);
        if previous.is_some() {
            tracing::debug!(name, "managed address record replaced");
        }
        Ok(())
    }

    /// Record an already known address.
    pub fn set_address(&self, name: &str, address: usize) {
        self.resolved.lock().insert(name.to_string(), address);
    }

    /// The record stored under `name`.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<AddressRecord> {
        self.entries.lock().get(name).map(|entry| entry.record.clone())
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Resolve `name`, scanning on first use.
    ///
    /// # Errors
    ///
    /// - [`HostError::AddressNotFound`] when no record or known address exists.
    /// - [`HostError::PatternNotFound`] when there is no resolver, the pattern
    ///   does not match, or the offset leaves the address space.
    pub fn resolve(&self, name: &str) -> Result<usize, HostError> {
        if let Some(address) = self.resolved.lock().get(name) {
            return Ok(*address);
        }

        let (pattern, offset, generation) = {
            let entries = self.entries.lock();
            let entry = entries.get(name).ok_or_else(|| HostError::AddressNotFound {
                name: name.to_string(),
            })?;
            (entry.pattern.clone(), entry.record.offset, entry.generation)
        };

        let not_found = || HostError::PatternNotFound {
            name: name.to_string(),
        };
        let matched = self
            .resolver
            .read()
            .as_ref()
            .and_then(|resolver| resolver.find(&pattern))
            .ok_or_else(not_found)?;
        let address = matched.checked_add_signed(offset).ok_or_else(not_found)?;

        tracing::debug!(
            name,
            address = format_args!("{address:#x}"),
            "managed address resolved"
        );
        let entries = self.entries.lock();
        if entries.get(name).is_some_and(|entry| entry.generation == generation) {
            self.resolved.lock().insert(name.to_string(), address);
        } else {
            tracing::debug!(name, "record replaced during resolution, not caching");
        }
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static IMAGE: [u8; 12] = [
        0x90, 0x90, 0x48, 0x8B, 0x05, 0x11, 0x22, 0x33, 0x44, 0xC3, 0xCC, 0xCC,
    ];

    #[test]
    fn test_parse_and_display() -> Result<(), HostError> {
        let pattern = Pattern::parse("48 8b ?? 05")?;
        assert_eq!(pattern.len(), 4);
        assert_eq!(pattern.to_string(), "48 8B ?? 05");
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Pattern::parse(""), Err(_)));
        assert!(matches!(Pattern::parse("?? ??"), Err(_)));
        assert!(matches!(Pattern::parse("4"), Err(_)));
        assert!(matches!(Pattern::parse("GG"), Err(_)));
        assert!(matches!(Pattern::parse("488B"), Err(_)));
    }

    #[test]
    fn test_find_with_wildcards() -> Result<(), HostError> {
        let pattern: Pattern = "8B ? 11".parse()?;
        assert_eq!(pattern.find(&IMAGE), Some(3));
        assert_eq!(Pattern::parse("C3 CC CC CC")?.find(&IMAGE), None);
        Ok(())
    }

    #[test]
    fn test_resolve_applies_offset_and_caches() -> Result<(), HostError> {
        let book = AddressBook::new();
        book.set_resolver(RegionResolver::new(&IMAGE));
        book.set_record(AddressRecord {
            name: "Load".to_string(),
            pattern: "48 8B 05".to_string(),
            offset: -2,
        })?;

        let base = IMAGE.as_ptr() as usize;
        assert_eq!(book.resolve("Load")?, base);
        assert_eq!(book.resolve("Load")?, base);
        Ok(())
    }

    #[test]
    fn test_replacing_record_drops_cache() -> Result<(), HostError> {
        let book = AddressBook::new();
        book.set_resolver(RegionResolver::new(&IMAGE));
        let mut record = AddressRecord {
            name: "Ret".to_string(),
            pattern: "C3".to_string(),
            offset: 0,
        };
        book.set_record(record.clone())?;
        let first = book.resolve("Ret")?;

        record.offset = 1;
        book.set_record(record)?;
        assert_eq!(book.resolve("Ret")?, first + 1);
        Ok(())
    }

    static SWAP_IMAGE: [u8; 8] = [0xAA, 0xBB, 0x00, 0x00, 0xCC, 0xDD, 0x00, 0x00];

    /// Replaces record `x` from inside its first scan.
    struct ReplacingResolver {
        book: &'static AddressBook,
        inner: RegionResolver,
        replaced: std::sync::atomic::AtomicBool,
    }

    impl AddressResolver for ReplacingResolver {
        fn find(&self, pattern: &Pattern) -> Option<usize> {
            if !self.replaced.swap(true, std::sync::atomic::Ordering::SeqCst) {
                let replaced = self.book.set_record(AddressRecord {
                    name: "x".to_string(),
                    pattern: "CC DD".to_string(),
                    offset: 0,
                });
                assert!(matches!(replaced, Ok(())));
            }
            self.inner.find(pattern)
        }
    }

    #[test]
    fn test_record_replaced_mid_scan_is_not_cached_stale() -> Result<(), HostError> {
        let book: &'static AddressBook = Box::leak(Box::new(AddressBook::new()));
        book.set_resolver(ReplacingResolver {
            book,
            inner: RegionResolver::new(&SWAP_IMAGE),
            replaced: std::sync::atomic::AtomicBool::new(false),
        });
        book.set_record(AddressRecord {
            name: "x".to_string(),
            pattern: "AA BB".to_string(),
            offset: 0,
        })?;

        let base = SWAP_IMAGE.as_ptr() as usize;
        // The in-flight scan still answers for the pattern it started with.
        assert_eq!(book.resolve("x")?, base);
        assert_eq!(book.resolve("x")?, base + 4);
        assert_eq!(book.resolve("x")?, base + 4);
        Ok(())
    }

    #[test]
    fn test_unknown_and_unmatched() -> Result<(), HostError> {
        let book = AddressBook::new();
        assert!(matches!(
            book.resolve("missing"),
            Err(HostError::AddressNotFound { .. })
        ));

        book.set_record(AddressRecord {
            name: "Nope".to_string(),
            pattern: "DE AD".to_string(),
            offset: 0,
        })?;
        assert!(matches!(
            book.resolve("Nope"),
            Err(HostError::PatternNotFound { .. })
        ));

        book.set_resolver(RegionResolver::new(&IMAGE));
        assert!(matches!(
            book.resolve("Nope"),
            Err(HostError::PatternNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_record_leaves_book_unchanged() {
        let book = AddressBook::new();
        let result = book.set_record(AddressRecord {
            name: "Bad".to_string(),
            pattern: "XYZ".to_string(),
            offset: 0,
        });
        assert!(matches!(result, Err(HostError::InvalidPattern { .. })));
        assert!(book.is_empty());
    }

    #[test]
    fn test_known_address_skips_resolution() -> Result<(), HostError> {
        let book = AddressBook::new();
        book.set_address("Fixed", 0x1000);
        assert_eq!(book.resolve("Fixed")?, 0x1000);
        Ok(())
    }
}

//! Shared ABI types: log levels and the versioned table envelope.

#![expect(unsafe_code, reason = "the versioned envelope carries a raw table pointer")]

use core::ffi::c_void;
use core::fmt;

use luaf_errors::AbiError;

use crate::constants::TABLE_MAGIC;
use crate::table::CapabilityTable;

/// Severity of a log record crossing the boundary.
///
/// The second generation passes this as `i32`, the first as `u32`; both use
/// the same numbering.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogLevel {
    /// Very detailed tracing information
    Trace = 0,
    /// Detailed debugging information
    Debug = 1,
    /// General operational information
    Info = 2,
    /// Potential issues that should be investigated
    Warn = 3,
    /// Failures that need attention
    Error = 4,
}

impl LogLevel {
    /// All levels, most verbose first.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    /// Decode a second generation level.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(LogLevel::Trace),
            1 => Some(LogLevel::Debug),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Warn),
            4 => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Decode a first generation level.
    #[must_use]
    pub const fn from_raw_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(LogLevel::Trace),
            1 => Some(LogLevel::Debug),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Warn),
            4 => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Wire value for the second generation.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Wire value for the first generation.
    #[must_use]
    pub const fn as_raw_u32(self) -> u32 {
        match self {
            LogLevel::Trace => 0,
            LogLevel::Debug => 1,
            LogLevel::Info => 2,
            LogLevel::Warn => 3,
            LogLevel::Error => 4,
        }
    }

    /// Upper-case name, as printed in log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header placed in front of a capability table by the versioned entry point.
///
/// # Memory Layout
///
/// | Offset | Size | Field      |
/// |--------|------|------------|
/// | 0      | 4    | magic      |
/// | 4      | 4    | generation |
/// | 8      | 4    | size       |
/// | 12     | 4    | reserved   |
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    /// Must be [`TABLE_MAGIC`]
    pub magic: u32,
    /// Layout generation of the table that follows
    pub generation: u32,
    /// `size_of` the top-level table struct, in bytes
    pub size: u32,
    /// Reserved, must be 0
    pub reserved: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<TableHeader>(), 16);
static_assertions::const_assert_eq!(core::mem::align_of::<TableHeader>(), 4);

impl TableHeader {
    /// Header describing table type `T` as built into this binary.
    #[must_use]
    pub const fn for_table<T: CapabilityTable>() -> Self {
        Self {
            magic: TABLE_MAGIC,
            generation: T::GENERATION,
            size: core::mem::size_of::<T>() as u32,
            reserved: 0,
        }
    }

    /// Check whether this header describes table type `T`.
    #[must_use]
    pub fn check<T: CapabilityTable>(&self) -> TableCheck {
        let expected = Self::for_table::<T>();
        if self.magic != TABLE_MAGIC {
            TableCheck::BadMagic { actual: self.magic }
        } else if self.generation != expected.generation {
            TableCheck::GenerationMismatch {
                expected: expected.generation,
                actual: self.generation,
            }
        } else if self.size != expected.size {
            TableCheck::SizeMismatch {
                generation: self.generation,
                expected: expected.size,
                actual: self.size,
            }
        } else {
            TableCheck::Compatible
        }
    }
}

/// Result of checking a [`TableHeader`] against a table type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCheck {
    /// Header matches - the table can be used.
    Compatible,
    /// Not a capability table header at all.
    BadMagic {
        /// Magic found in the header.
        actual: u32,
    },
    /// Different layout generation.
    GenerationMismatch {
        /// Generation this build understands.
        expected: u32,
        /// Generation the producer declared.
        actual: u32,
    },
    /// Same generation, different struct size.
    SizeMismatch {
        /// Generation both sides declared.
        generation: u32,
        /// Size this build expects.
        expected: u32,
        /// Size the producer declared.
        actual: u32,
    },
}

impl TableCheck {
    /// Whether the table can be used.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        matches!(self, TableCheck::Compatible)
    }

    /// Convert into a `Result`, mapping mismatches to [`AbiError`].
    ///
    /// # Errors
    ///
    /// Returns the mismatch as an [`AbiError`] when the header is not
    /// [`TableCheck::Compatible`].
    pub fn into_result(self) -> Result<(), AbiError> {
        match self {
            TableCheck::Compatible => Ok(()),
            TableCheck::BadMagic { actual } => Err(AbiError::BadMagic { actual }),
            TableCheck::GenerationMismatch { expected, actual } => {
                Err(AbiError::GenerationMismatch { expected, actual })
            }
            TableCheck::SizeMismatch {
                generation,
                expected,
                actual,
            } => Err(AbiError::SizeMismatch {
                generation,
                expected,
                actual,
            }),
        }
    }
}

/// A capability table tagged with its header.
///
/// Exported by the provider next to the legacy unversioned table and handed
/// to `ExtInitializeVersioned`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VersionedTable {
    /// Layout description of `table`
    pub header: TableHeader,
    /// Pointer to the table struct described by `header`
    pub table: *const c_void,
}

// SAFETY: `table` points at an immutable table that lives for the rest of the
// process; nothing is ever written through it.
unsafe impl Sync for VersionedTable {}
// SAFETY: see `Sync` above.
unsafe impl Send for VersionedTable {}

impl VersionedTable {
    /// Wrap a provider-owned table.
    #[must_use]
    pub const fn new<T: CapabilityTable>(table: &'static T) -> Self {
        Self {
            header: TableHeader::for_table::<T>(),
            table: (table as *const T).cast::<c_void>(),
        }
    }

    /// Check the header against table type `T`.
    #[must_use]
    pub fn check<T: CapabilityTable>(&self) -> TableCheck {
        self.header.check::<T>()
    }

    /// The table pointer, typed as `T` once the header has been validated.
    ///
    /// The pointer may still be null; dereferencing it is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an [`AbiError`] when the header does not describe `T`.
    pub fn table_ptr<T: CapabilityTable>(&self) -> Result<*const T, AbiError> {
        self.check::<T>().into_result()?;
        Ok(self.table.cast::<T>())
    }
}

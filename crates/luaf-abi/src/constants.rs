//! Table magic, generation numbers and entry point names.
//!
//! These constants define the contract between the core module and its
//! extensions. All integers use the platform's native byte order; tables never
//! leave the process.

/// Magic number at the start of every [`TableHeader`](crate::TableHeader).
///
/// 'LUAF' in little-endian: 0x4641554C
pub const TABLE_MAGIC: u32 = 0x4641_554C;

/// First generation table layout (no-argument callbacks).
pub const GENERATION_1: u32 = 1;

/// Second generation table layout (context callbacks, lock, input).
pub const GENERATION_2: u32 = 2;

/// Placeholder substituted for names and messages that are not valid UTF-8.
pub const INVALID_UTF8: &str = "<Invalid UTF-8>";

/// Names of the symbols an extension library exports.
pub mod entry_point {
    /// Legacy entry point: `ExtInitialize(param: *const CoreApiParam) -> i32`
    pub const LEGACY: &str = "ExtInitialize";
    /// Versioned entry point: `ExtInitializeVersioned(table: *const VersionedTable) -> i32`
    pub const VERSIONED: &str = "ExtInitializeVersioned";

    /// NUL-terminated form of [`LEGACY`] for symbol lookup.
    pub const LEGACY_SYMBOL: &[u8] = b"ExtInitialize\0";
    /// NUL-terminated form of [`VERSIONED`] for symbol lookup.
    pub const VERSIONED_SYMBOL: &[u8] = b"ExtInitializeVersioned\0";
}

/// Return codes for extension entry points.
pub mod return_code {
    /// Success - extension initialized
    pub const SUCCESS: i32 = 0;
    /// Generic error - extension initialization failed
    pub const ERROR: i32 = -1;
    /// Invalid argument - the table pointer was null
    pub const INVALID_ARG: i32 = -2;
    /// Already initialized - the registry slot was already filled
    pub const ALREADY_INITIALIZED: i32 = -3;
    /// ABI mismatch - the envelope did not describe this build's layout
    pub const ABI_MISMATCH: i32 = -4;
    /// Not initialized - the registry was used before initialization
    pub const NOT_INITIALIZED: i32 = -5;
}

//! Capability table ABI for the LuaFramework bridge.
//!
//! This crate is the single source of truth for the function-pointer tables
//! exchanged between the core module and independently built extensions:
//!
//! - [`gen1`]: the first generation layout. Callbacks take no arguments and
//!   the registrar functions sit next to a `functions` sub-table.
//! - [`gen2`]: the second generation layout. Callbacks receive an opaque
//!   context, and the table adds locking, introspection and input queries.
//! - [`TableHeader`] / [`VersionedTable`]: an envelope that tags a table with
//!   its generation and size so a mismatched build fails fast instead of
//!   misreading memory.
//!
//! # ABI Stability Guarantees
//!
//! Both generations are frozen. Every structure is `#[repr(C)]` and its size is
//! asserted at compile time. A new layout gets a new generation number and a
//! new module; existing modules are never edited.
//!
//! # Strings
//!
//! Strings cross the boundary as `(ptr, len)` byte pairs and are not
//! NUL-terminated. First generation producers historically passed `len == 0`
//! with a NUL-terminated buffer; [`ffi::decode_legacy_str`] honours that.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod constants;
pub mod ffi;
pub mod gen1;
pub mod gen2;
pub mod input;
pub mod prelude;
pub mod table;
pub mod types;

pub use constants::{GENERATION_1, GENERATION_2, TABLE_MAGIC, entry_point, return_code};
pub use input::{ControllerButton, ControllerButtons, KeyCode};
pub use table::{CapabilityTable, FunctionSignature};
pub use types::{LogLevel, TableCheck, TableHeader, VersionedTable};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_re_exports() {
        let header = TableHeader::for_table::<gen2::CoreApiParam>();
        assert_eq!(header.generation, GENERATION_2);
        assert_eq!(LogLevel::from_raw(2), Some(LogLevel::Info));
        assert_eq!(KeyCode::from_raw(1), Some(KeyCode::Escape));
    }

    #[test]
    fn test_generations_are_distinct() {
        assert_ne!(gen1::CoreApiParam::GENERATION, gen2::CoreApiParam::GENERATION);
    }
}

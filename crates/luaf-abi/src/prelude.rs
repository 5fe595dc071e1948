//! Prelude module for convenient imports.
//!
//! ```
//! use luaf_abi::prelude::*;
//!
//! let header = TableHeader::for_table::<gen2::CoreApiParam>();
//! assert!(header.check::<gen2::CoreApiParam>().is_compatible());
//! ```

pub use crate::constants::{GENERATION_1, GENERATION_2, INVALID_UTF8, TABLE_MAGIC};
pub use crate::constants::{entry_point, return_code};
pub use crate::input::{ControllerButton, ControllerButtons, KeyCode};
pub use crate::table::{CapabilityTable, FunctionSignature};
pub use crate::types::{LogLevel, TableCheck, TableHeader, VersionedTable};
pub use crate::{gen1, gen2};

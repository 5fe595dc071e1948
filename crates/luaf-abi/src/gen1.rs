//! First generation capability table.
//!
//! Frozen. Callbacks take no arguments; the registrar functions live in the
//! top-level struct next to a `functions` sub-table holding the lifecycle
//! registration and the logger.
//!
//! # Memory Layout
//!
//! `CoreApiParam`
//!
//! | Slot | Field               |
//! |------|---------------------|
//! | 0    | `add_core_function` |
//! | 1    | `get_core_function` |
//! | 2    | `functions`         |
//!
//! `CoreApiFunctions`
//!
//! | Slot | Field                    |
//! |------|--------------------------|
//! | 0    | `on_lua_state_created`   |
//! | 1    | `on_lua_state_destroyed` |
//! | 2    | `log`                    |
//!
//! Producers built from the C++ header pass string lengths of 0 with
//! NUL-terminated buffers; consumers in this crate always pass explicit
//! lengths and send empty strings as a lone NUL.

#![expect(unsafe_code, reason = "frozen `repr(C)` table shared across the library boundary")]

use core::ffi::c_void;

use crate::constants::GENERATION_1;
use crate::ffi::legacy_arg;
use crate::table::CapabilityTable;
use crate::types::LogLevel;

/// Lifecycle callback with no context.
pub type StateCallback = extern "C" fn();

/// `add_core_function(name, name_len, func)`
pub type AddFunctionFn = extern "C" fn(name: *const u8, len: u32, func: *const c_void);
/// `get_core_function(name, name_len) -> func`
pub type GetFunctionFn = extern "C" fn(name: *const u8, len: u32) -> *const c_void;
/// `on_lua_state_created(cb)` / `on_lua_state_destroyed(cb)`
pub type SubscribeFn = extern "C" fn(callback: StateCallback);
/// `log(level, msg, msg_len)`
pub type LogFn = extern "C" fn(level: u32, msg: *const u8, len: u32);

/// Lifecycle registration and logging.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CoreApiFunctions {
    on_lua_state_created: SubscribeFn,
    on_lua_state_destroyed: SubscribeFn,
    log: LogFn,
}

impl CoreApiFunctions {
    /// Assemble the sub-table.
    #[must_use]
    pub const fn new(
        on_lua_state_created: SubscribeFn,
        on_lua_state_destroyed: SubscribeFn,
        log: LogFn,
    ) -> Self {
        Self {
            on_lua_state_created,
            on_lua_state_destroyed,
            log,
        }
    }

    /// Subscribe to interpreter state creation.
    pub fn on_lua_state_created(&self, callback: StateCallback) {
        (self.on_lua_state_created)(callback)
    }

    /// Subscribe to interpreter state destruction.
    pub fn on_lua_state_destroyed(&self, callback: StateCallback) {
        (self.on_lua_state_destroyed)(callback)
    }
}

/// First generation top-level table.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CoreApiParam {
    add_core_function: AddFunctionFn,
    get_core_function: GetFunctionFn,
    functions: *const CoreApiFunctions,
}

// SAFETY: the table only holds function pointers and a pointer to an
// immutable `'static` sub-table (see `CoreApiParam::new`).
unsafe impl Sync for CoreApiParam {}
// SAFETY: see `Sync` above.
unsafe impl Send for CoreApiParam {}

impl CoreApiParam {
    /// Assemble the table. The sub-table must live for the whole process.
    #[must_use]
    pub const fn new(
        add_core_function: AddFunctionFn,
        get_core_function: GetFunctionFn,
        functions: &'static CoreApiFunctions,
    ) -> Self {
        Self {
            add_core_function,
            get_core_function,
            functions: functions as *const CoreApiFunctions,
        }
    }

    /// Lifecycle and logging sub-table.
    #[must_use]
    pub fn functions(&self) -> &CoreApiFunctions {
        // SAFETY: set from a `'static` reference in `new`, or handed over by a
        // foreign producer under the registry's initialization contract.
        unsafe { &*self.functions }
    }
}

impl CapabilityTable for CoreApiParam {
    const GENERATION: u32 = GENERATION_1;

    fn add_core_function(&self, name: &[u8], func: *const c_void) {
        let (ptr, len) = legacy_arg(name);
        (self.add_core_function)(ptr, len, func)
    }

    fn get_core_function(&self, name: &[u8]) -> *const c_void {
        let (ptr, len) = legacy_arg(name);
        (self.get_core_function)(ptr, len)
    }

    fn log(&self, level: LogLevel, message: &[u8]) {
        let (ptr, len) = legacy_arg(message);
        (self.functions().log)(level.as_raw_u32(), ptr, len)
    }
}

const PTR: usize = core::mem::size_of::<usize>();
static_assertions::const_assert_eq!(core::mem::size_of::<CoreApiParam>(), 3 * PTR);
static_assertions::const_assert_eq!(core::mem::size_of::<CoreApiFunctions>(), 3 * PTR);
static_assertions::const_assert_eq!(core::mem::align_of::<CoreApiParam>(), PTR);

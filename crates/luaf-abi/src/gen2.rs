//! Second generation capability table.
//!
//! Frozen. Callbacks receive an opaque context pointer. The top-level struct
//! holds four slots: the function registrar sub-table, the logger, the
//! interpreter sub-table and the input sub-table.
//!
//! # Memory Layout
//!
//! | Struct             | Slots                                                                                                 |
//! |--------------------|-------------------------------------------------------------------------------------------------------|
//! | `CoreApiParam`     | `functions`, `log`, `lua`, `input`                                                                    |
//! | `CoreApiFunctions` | `add_core_function`, `get_core_function`, `get_singleton`, `get_managed_address`, `set_managed_address` |
//! | `CoreApiLua`       | `on_lua_state_created`, `on_lua_state_destroyed`, `with_lua_lock`                                     |
//! | `CoreApiInput`     | `is_key_pressed`, `is_key_down`, `is_controller_pressed`, `is_controller_down`                        |

#![expect(unsafe_code, reason = "frozen `repr(C)` table shared across the library boundary")]

use core::ffi::c_void;

use crate::constants::GENERATION_2;
use crate::ffi::abi_len;
use crate::table::CapabilityTable;
use crate::types::LogLevel;

/// Lifecycle callback receiving the interpreter state.
pub type StateCallback = unsafe extern "C" fn(lua_state: *mut c_void);
/// Body run under the interpreter lock.
pub type LockCallback = extern "C" fn(user_data: *mut c_void);

/// `log(level, msg, msg_len)`
pub type LogFn = extern "C" fn(level: i32, msg: *const u8, len: u32);
/// `add_core_function(name, name_len, func)`
pub type AddFunctionFn = extern "C" fn(name: *const u8, len: u32, func: *const c_void);
/// `get_core_function(name, name_len) -> func`
pub type GetFunctionFn = extern "C" fn(name: *const u8, len: u32) -> *const c_void;
/// `get_singleton(name, len)` / `get_managed_address(name, len)`
pub type LookupFn = extern "C" fn(name: *const u8, len: u32) -> *mut c_void;
/// `set_managed_address(name, name_len, pattern, pattern_len, offset)`
pub type SetAddressFn =
    extern "C" fn(name: *const u8, name_len: u32, pattern: *const u8, pattern_len: u32, offset: i32);
/// `on_lua_state_created(cb)` / `on_lua_state_destroyed(cb)`
pub type SubscribeFn = extern "C" fn(callback: StateCallback);
/// `with_lua_lock(cb, user_data)`
pub type WithLockFn = extern "C" fn(callback: LockCallback, user_data: *mut c_void);
/// Input query by raw key code or button bit.
pub type InputQueryFn = extern "C" fn(code: u32) -> bool;

/// Function namespace and introspection.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CoreApiFunctions {
    add_core_function: AddFunctionFn,
    get_core_function: GetFunctionFn,
    get_singleton: LookupFn,
    get_managed_address: LookupFn,
    set_managed_address: SetAddressFn,
}

impl CoreApiFunctions {
    /// Assemble the sub-table.
    #[must_use]
    pub const fn new(
        add_core_function: AddFunctionFn,
        get_core_function: GetFunctionFn,
        get_singleton: LookupFn,
        get_managed_address: LookupFn,
        set_managed_address: SetAddressFn,
    ) -> Self {
        Self {
            add_core_function,
            get_core_function,
            get_singleton,
            get_managed_address,
            set_managed_address,
        }
    }

    /// Register a function by name.
    pub fn add_core_function(&self, name: &[u8], func: *const c_void) {
        (self.add_core_function)(name.as_ptr(), abi_len(name), func)
    }

    /// Look up a function by name. Null means absent.
    #[must_use]
    pub fn get_core_function(&self, name: &[u8]) -> *const c_void {
        (self.get_core_function)(name.as_ptr(), abi_len(name))
    }

    /// Look up a host singleton by name. Null means absent.
    #[must_use]
    pub fn get_singleton(&self, name: &[u8]) -> *mut c_void {
        (self.get_singleton)(name.as_ptr(), abi_len(name))
    }

    /// Look up a resolved managed address by name. Null means absent or
    /// unresolved.
    #[must_use]
    pub fn get_managed_address(&self, name: &[u8]) -> *mut c_void {
        (self.get_managed_address)(name.as_ptr(), abi_len(name))
    }

    /// Record a managed address pattern.
    pub fn set_managed_address(&self, name: &[u8], pattern: &[u8], offset: i32) {
        (self.set_managed_address)(
            name.as_ptr(),
            abi_len(name),
            pattern.as_ptr(),
            abi_len(pattern),
            offset,
        )
    }
}

/// Interpreter lifecycle and locking.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CoreApiLua {
    on_lua_state_created: SubscribeFn,
    on_lua_state_destroyed: SubscribeFn,
    with_lua_lock: WithLockFn,
}

impl CoreApiLua {
    /// Assemble the sub-table.
    #[must_use]
    pub const fn new(
        on_lua_state_created: SubscribeFn,
        on_lua_state_destroyed: SubscribeFn,
        with_lua_lock: WithLockFn,
    ) -> Self {
        Self {
            on_lua_state_created,
            on_lua_state_destroyed,
            with_lua_lock,
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

    /// Run `callback(user_data)` while holding the interpreter lock.
    pub fn with_lua_lock(&self, callback: LockCallback, user_data: *mut c_void) {
        (self.with_lua_lock)(callback, user_data)
    }
}

/// Keyboard and controller queries.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CoreApiInput {
    is_key_pressed: InputQueryFn,
    is_key_down: InputQueryFn,
    is_controller_pressed: InputQueryFn,
    is_controller_down: InputQueryFn,
}

impl CoreApiInput {
    /// Assemble the sub-table.
    #[must_use]
    pub const fn new(
        is_key_pressed: InputQueryFn,
        is_key_down: InputQueryFn,
        is_controller_pressed: InputQueryFn,
        is_controller_down: InputQueryFn,
    ) -> Self {
        Self {
            is_key_pressed,
            is_key_down,
            is_controller_pressed,
            is_controller_down,
        }
    }

    /// Key went down this frame.
    #[must_use]
    pub fn is_key_pressed(&self, key: u32) -> bool {
        (self.is_key_pressed)(key)
    }

    /// Key is held.
    #[must_use]
    pub fn is_key_down(&self, key: u32) -> bool {
        (self.is_key_down)(key)
    }

    /// Button went down this frame.
    #[must_use]
    pub fn is_controller_pressed(&self, button: u32) -> bool {
        (self.is_controller_pressed)(button)
    }

    /// Button is held.
    #[must_use]
    pub fn is_controller_down(&self, button: u32) -> bool {
        (self.is_controller_down)(button)
    }
}

/// Second generation top-level table.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CoreApiParam {
    functions: *const CoreApiFunctions,
    log: LogFn,
    lua: *const CoreApiLua,
    input: *const CoreApiInput,
}

// SAFETY: the table only holds a function pointer and pointers to immutable
// `'static` sub-tables (see `CoreApiParam::new`).
unsafe impl Sync for CoreApiParam {}
// SAFETY: see `Sync` above.
unsafe impl Send for CoreApiParam {}

impl CoreApiParam {
    /// Assemble the table. Sub-tables must live for the whole process.
    #[must_use]
    pub const fn new(
        functions: &'static CoreApiFunctions,
        log: LogFn,
        lua: &'static CoreApiLua,
        input: &'static CoreApiInput,
    ) -> Self {
        Self {
            functions: functions as *const CoreApiFunctions,
            log,
            lua: lua as *const CoreApiLua,
            input: input as *const CoreApiInput,
        }
    }

    /// Function namespace and introspection sub-table.
    #[must_use]
    pub fn functions(&self) -> &CoreApiFunctions {
        // SAFETY: set from a `'static` reference in `new`, or handed over by a
        // foreign producer under the registry's initialization contract.
        unsafe { &*self.functions }
    }

    /// Interpreter sub-table.
    #[must_use]
    pub fn lua(&self) -> &CoreApiLua {
        // SAFETY: as for `functions`.
        unsafe { &*self.lua }
    }

    /// Input sub-table.
    #[must_use]
    pub fn input(&self) -> &CoreApiInput {
        // SAFETY: as for `functions`.
        unsafe { &*self.input }
    }
}

impl CapabilityTable for CoreApiParam {
    const GENERATION: u32 = GENERATION_2;

    fn add_core_function(&self, name: &[u8], func: *const c_void) {
        self.functions().add_core_function(name, func)
    }

    fn get_core_function(&self, name: &[u8]) -> *const c_void {
        self.functions().get_core_function(name)
    }

    fn log(&self, level: LogLevel, message: &[u8]) {
        (self.log)(level.as_raw(), message.as_ptr(), abi_len(message))
    }
}

const PTR: usize = core::mem::size_of::<usize>();
static_assertions::const_assert_eq!(core::mem::size_of::<CoreApiParam>(), 4 * PTR);
static_assertions::const_assert_eq!(core::mem::size_of::<CoreApiFunctions>(), 5 * PTR);
static_assertions::const_assert_eq!(core::mem::size_of::<CoreApiLua>(), 3 * PTR);
static_assertions::const_assert_eq!(core::mem::size_of::<CoreApiInput>(), 4 * PTR);

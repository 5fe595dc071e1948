//! The static capability tables and their `extern "C"` entry points.
//!
//! Every entry point forwards to the installed [`CoreHost`]. Names arrive as
//! `(ptr, len)` pairs; first generation producers may send `len == 0` with a
//! NUL-terminated buffer. Invalid UTF-8 decodes to `"<Invalid UTF-8>"`.

#![expect(unsafe_code, reason = "`extern \"C\"` entry points decode raw arguments")]

use std::ffi::c_void;

use luaf_abi::ffi::{decode_legacy_str, decode_str};
use luaf_abi::{LogLevel, VersionedTable, gen1, gen2};

use crate::address::AddressRecord;
use crate::host::CoreHost;

fn host() -> Option<&'static CoreHost> {
    let host = CoreHost::installed();
    if host.is_none() {
        tracing::warn!("capability table called with no core host installed");
    }
    host
}

/// Wire log level, unknown values read as info.
fn level_or_info(level: Option<LogLevel>) -> LogLevel {
    level.unwrap_or(LogLevel::Info)
}

// Shared by both generations once the strings are decoded.

fn add_function(name: &str, func: *const c_void) {
    if let Some(host) = host() {
        host.functions().register(name, func);
    }
}

fn get_function(name: &str) -> *const c_void {
    let found = host()
        .and_then(|host| host.functions().get(name))
        .map_or(std::ptr::null(), |ptr| ptr.as_ptr().cast_const());
    tracing::debug!(name, found = !found.is_null(), "extension function lookup");
    found
}

fn log(level: LogLevel, message: &str) {
    if let Some(host) = host() {
        host.log(level, message);
    }
}

// First generation.

extern "C" fn legacy_add_core_function(name: *const u8, len: u32, func: *const c_void) {
    // SAFETY: table contract: a valid `(ptr, len)` pair or a NUL-terminated
    // buffer with `len == 0`.
    let name = unsafe { decode_legacy_str(name, len) };
    add_function(name, func);
}

extern "C" fn legacy_get_core_function(name: *const u8, len: u32) -> *const c_void {
    // SAFETY: as above.
    let name = unsafe { decode_legacy_str(name, len) };
    get_function(name)
}

extern "C" fn legacy_on_lua_state_created(callback: gen1::StateCallback) {
    if let Some(host) = host() {
        host.subscribers().subscribe_legacy_created(callback);
    }
}

extern "C" fn legacy_on_lua_state_destroyed(callback: gen1::StateCallback) {
    if let Some(host) = host() {
        host.subscribers().subscribe_legacy_destroyed(callback);
    }
}

extern "C" fn legacy_log(level: u32, msg: *const u8, len: u32) {
    // SAFETY: as for `legacy_add_core_function`.
    let message = unsafe { decode_legacy_str(msg, len) };
    log(level_or_info(LogLevel::from_raw_u32(level)), message);
}

// Second generation.

extern "C" fn add_core_function(name: *const u8, len: u32, func: *const c_void) {
    // SAFETY: table contract: `name` is valid for `len` bytes.
    let name = unsafe { decode_str(name, len) };
    add_function(name, func);
}

extern "C" fn get_core_function(name: *const u8, len: u32) -> *const c_void {
    // SAFETY: as above.
    let name = unsafe { decode_str(name, len) };
    get_function(name)
}

extern "C" fn get_singleton(name: *const u8, len: u32) -> *mut c_void {
    // SAFETY: as above.
    let name = unsafe { decode_str(name, len) };
    let found = host()
        .and_then(|host| host.singletons().get(name))
        .map_or(std::ptr::null_mut(), |ptr| ptr.as_ptr());
    tracing::debug!(name, ptr = ?found, "get singleton");
    found
}

extern "C" fn get_managed_address(name: *const u8, len: u32) -> *mut c_void {
    // SAFETY: as above.
    let name = unsafe { decode_str(name, len) };
    let Some(host) = host() else {
        return std::ptr::null_mut();
    };
    match host.addresses().resolve(name) {
        Ok(address) => address as *mut c_void,
        Err(err) => {
            tracing::debug!(name, error = %err, "managed address unavailable");
            std::ptr::null_mut()
        }
    }
}

extern "C" fn set_managed_address(
    name: *const u8,
    name_len: u32,
    pattern: *const u8,
    pattern_len: u32,
    offset: i32,
) {
    // SAFETY: as above.
    let name = unsafe { decode_str(name, name_len) };
    // SAFETY: as above.
    let pattern = unsafe { decode_str(pattern, pattern_len) };
    tracing::debug!(name, pattern, offset, "set managed address");

    let Some(host) = host() else {
        return;
    };
    let record = AddressRecord {
        name: name.to_string(),
        pattern: pattern.to_string(),
        offset: offset as isize,
    };
    if let Err(err) = host.addresses().set_record(record) {
        tracing::warn!(name, error = %err, "managed address record rejected");
    }
}

extern "C" fn on_lua_state_created(callback: gen2::StateCallback) {
    if let Some(host) = host() {
        host.subscribers().subscribe_created(callback);
    }
}

extern "C" fn on_lua_state_destroyed(callback: gen2::StateCallback) {
    if let Some(host) = host() {
        host.subscribers().subscribe_destroyed(callback);
    }
}

extern "C" fn with_lua_lock(callback: gen2::LockCallback, user_data: *mut c_void) {
    if let Some(host) = host() {
        host.lua_lock().run(|| callback(user_data));
    }
}

extern "C" fn gen2_log(level: i32, msg: *const u8, len: u32) {
    // SAFETY: table contract: `msg` is valid for `len` bytes.
    let message = unsafe { decode_str(msg, len) };
    log(level_or_info(LogLevel::from_raw(level)), message);
}

extern "C" fn is_key_pressed(key: u32) -> bool {
    host().is_some_and(|host| host.input().query_key(key, true))
}

extern "C" fn is_key_down(key: u32) -> bool {
    host().is_some_and(|host| host.input().query_key(key, false))
}

extern "C" fn is_controller_pressed(button: u32) -> bool {
    host().is_some_and(|host| host.input().query_button(button, true))
}

extern "C" fn is_controller_down(button: u32) -> bool {
    host().is_some_and(|host| host.input().query_button(button, false))
}

static GEN1_FUNCTIONS: gen1::CoreApiFunctions = gen1::CoreApiFunctions::new(
    legacy_on_lua_state_created,
    legacy_on_lua_state_destroyed,
    legacy_log,
);

pub(crate) static GEN1_TABLE: gen1::CoreApiParam = gen1::CoreApiParam::new(
    legacy_add_core_function,
    legacy_get_core_function,
    &GEN1_FUNCTIONS,
);

pub(crate) static GEN1_ENVELOPE: VersionedTable = VersionedTable::new(&GEN1_TABLE);

static GEN2_FUNCTIONS: gen2::CoreApiFunctions = gen2::CoreApiFunctions::new(
    add_core_function,
    get_core_function,
    get_singleton,
    get_managed_address,
    set_managed_address,
);

static GEN2_LUA: gen2::CoreApiLua =
    gen2::CoreApiLua::new(on_lua_state_created, on_lua_state_destroyed, with_lua_lock);

static GEN2_INPUT: gen2::CoreApiInput = gen2::CoreApiInput::new(
    is_key_pressed,
    is_key_down,
    is_controller_pressed,
    is_controller_down,
);

pub(crate) static GEN2_TABLE: gen2::CoreApiParam =
    gen2::CoreApiParam::new(&GEN2_FUNCTIONS, gen2_log, &GEN2_LUA, &GEN2_INPUT);

pub(crate) static GEN2_ENVELOPE: VersionedTable = VersionedTable::new(&GEN2_TABLE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_levels_read_as_info() {
        assert_eq!(level_or_info(LogLevel::from_raw(42)), LogLevel::Info);
        assert_eq!(level_or_info(LogLevel::from_raw(4)), LogLevel::Error);
    }

    #[test]
    fn test_entry_points_without_host_are_inert() {
        if CoreHost::installed().is_some() {
            return;
        }
        assert!(get_core_function(b"x".as_ptr(), 1).is_null());
        assert!(get_singleton(b"x".as_ptr(), 1).is_null());
        assert!(get_managed_address(b"x".as_ptr(), 1).is_null());
        assert!(!is_key_down(1));
    }
}

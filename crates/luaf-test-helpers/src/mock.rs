//! Recording capability table provider.
//!
//! Both table generations are backed by one process-wide [`Recorder`]. Tests
//! hold [`serial`](crate::serial::serial), call [`reset`], hand
//! [`gen1_table`], [`gen2_table`] or [`gen2_envelope`] to the code under test
//! and then inspect what reached the provider.

use std::ffi::c_void;

use luaf_abi::ffi::{decode_legacy_str, decode_str};
use luaf_abi::{LogLevel, VersionedTable, gen1, gen2};
use parking_lot::Mutex;

/// One log record as received by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Decoded level, `None` for an unknown wire value.
    pub level: Option<LogLevel>,
    /// Decoded message.
    pub message: String,
    /// Length field as sent.
    pub raw_len: u32,
}

/// One `set_managed_address` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCall {
    /// Record name
    pub name: String,
    /// Byte pattern
    pub pattern: String,
    /// Offset from the match
    pub offset: i32,
}

/// Everything the provider has seen.
#[derive(Debug)]
pub struct Recorder {
    /// Log records, oldest first.
    pub logs: Vec<LogEntry>,
    /// Registered functions as `(name, address)`; later entries win.
    pub functions: Vec<(String, usize)>,
    /// Names passed to `get_core_function`.
    pub lookups: Vec<String>,
    /// Singleton table served by `get_singleton`.
    pub singletons: Vec<(String, usize)>,
    /// `set_managed_address` calls.
    pub address_calls: Vec<AddressCall>,
    /// Gen1 creation subscribers.
    pub gen1_created: Vec<gen1::StateCallback>,
    /// Gen1 destruction subscribers.
    pub gen1_destroyed: Vec<gen1::StateCallback>,
    /// Gen2 creation subscribers.
    pub gen2_created: Vec<gen2::StateCallback>,
    /// Gen2 destruction subscribers.
    pub gen2_destroyed: Vec<gen2::StateCallback>,
    /// Number of `with_lua_lock` calls.
    pub lock_calls: usize,
    /// Whether `with_lua_lock` runs the callback.
    pub lock_runs_body: bool,
    /// Keys reported as pressed this frame.
    pub keys_pressed: Vec<u32>,
    /// Keys reported as held.
    pub keys_down: Vec<u32>,
    /// Controller bits reported as pressed this frame.
    pub buttons_pressed: u32,
    /// Controller bits reported as held.
    pub buttons_down: u32,
}

impl Recorder {
    const fn new() -> Self {
        Self {
            logs: Vec::new(),
            functions: Vec::new(),
            lookups: Vec::new(),
            singletons: Vec::new(),
            address_calls: Vec::new(),
            gen1_created: Vec::new(),
            gen1_destroyed: Vec::new(),
            gen2_created: Vec::new(),
            gen2_destroyed: Vec::new(),
            lock_calls: 0,
            lock_runs_body: true,
            keys_pressed: Vec::new(),
            keys_down: Vec::new(),
            buttons_pressed: 0,
            buttons_down: 0,
        }
    }

    fn function(&self, name: &str) -> usize {
        self.functions
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map_or(0, |(_, addr)| *addr)
    }
}

static RECORDER: Mutex<Recorder> = parking_lot::const_mutex(Recorder::new());

/// Clear all recorded state.
pub fn reset() {
    *RECORDER.lock() = Recorder::new();
}

/// Run `f` with the recorder locked.
pub fn with_recorder<R>(f: impl FnOnce(&mut Recorder) -> R) -> R {
    f(&mut RECORDER.lock())
}

/// Log records received so far.
pub fn logs() -> Vec<LogEntry> {
    RECORDER.lock().logs.clone()
}

/// Serve `ptr` for `get_singleton(name)`.
pub fn set_singleton(name: &str, ptr: *mut c_void) {
    RECORDER
        .lock()
        .singletons
        .push((name.to_string(), ptr as usize));
}

/// Fire gen2 creation subscribers with `state`, outside the recorder lock.
pub fn fire_gen2_created(state: *mut c_void) {
    let subscribers = RECORDER.lock().gen2_created.clone();
    for callback in subscribers {
        // SAFETY: subscribers are `unsafe extern "C"` callbacks registered by
        // the test itself and accept any state pointer.
        unsafe { callback(state) };
    }
}

/// Fire gen1 creation subscribers, outside the recorder lock.
pub fn fire_gen1_created() {
    let subscribers = RECORDER.lock().gen1_created.clone();
    for callback in subscribers {
        callback();
    }
}

/// Gen1 table backed by the recorder.
pub fn gen1_table() -> &'static gen1::CoreApiParam {
    &GEN1_PARAM
}

/// Gen2 table backed by the recorder.
pub fn gen2_table() -> &'static gen2::CoreApiParam {
    &GEN2_PARAM
}

/// Versioned envelope around [`gen2_table`].
pub fn gen2_envelope() -> &'static VersionedTable {
    &GEN2_ENVELOPE
}

static GEN1_FUNCTIONS: gen1::CoreApiFunctions =
    gen1::CoreApiFunctions::new(gen1_on_created, gen1_on_destroyed, gen1_log);
static GEN1_PARAM: gen1::CoreApiParam =
    gen1::CoreApiParam::new(gen1_add, gen1_get, &GEN1_FUNCTIONS);

static GEN2_FUNCTIONS: gen2::CoreApiFunctions = gen2::CoreApiFunctions::new(
    gen2_add,
    gen2_get,
    gen2_singleton,
    gen2_managed_address,
    gen2_set_managed_address,
);
static GEN2_LUA: gen2::CoreApiLua =
    gen2::CoreApiLua::new(gen2_on_created, gen2_on_destroyed, gen2_with_lock);
static GEN2_INPUT: gen2::CoreApiInput = gen2::CoreApiInput::new(
    gen2_key_pressed,
    gen2_key_down,
    gen2_button_pressed,
    gen2_button_down,
);
static GEN2_PARAM: gen2::CoreApiParam =
    gen2::CoreApiParam::new(&GEN2_FUNCTIONS, gen2_log, &GEN2_LUA, &GEN2_INPUT);
static GEN2_ENVELOPE: VersionedTable = VersionedTable::new(&GEN2_PARAM);

extern "C" fn gen1_add(name: *const u8, len: u32, func: *const c_void) {
    // SAFETY: gen1 callers pass a valid buffer or a C string.
    let name = unsafe { decode_legacy_str(name, len) };
    RECORDER
        .lock()
        .functions
        .push((name.to_string(), func as usize));
}

extern "C" fn gen1_get(name: *const u8, len: u32) -> *const c_void {
    // SAFETY: as above.
    let name = unsafe { decode_legacy_str(name, len) };
    let mut recorder = RECORDER.lock();
    recorder.lookups.push(name.to_string());
    recorder.function(name) as *const c_void
}

extern "C" fn gen1_on_created(callback: gen1::StateCallback) {
    RECORDER.lock().gen1_created.push(callback);
}

extern "C" fn gen1_on_destroyed(callback: gen1::StateCallback) {
    RECORDER.lock().gen1_destroyed.push(callback);
}

extern "C" fn gen1_log(level: u32, msg: *const u8, len: u32) {
    // SAFETY: as above.
    let message = unsafe { decode_legacy_str(msg, len) };
    RECORDER.lock().logs.push(LogEntry {
        level: LogLevel::from_raw_u32(level),
        message: message.to_string(),
        raw_len: len,
    });
}

extern "C" fn gen2_add(name: *const u8, len: u32, func: *const c_void) {
    // SAFETY: gen2 callers pass explicit lengths.
    let name = unsafe { decode_str(name, len) };
    RECORDER
        .lock()
        .functions
        .push((name.to_string(), func as usize));
}

extern "C" fn gen2_get(name: *const u8, len: u32) -> *const c_void {
    // SAFETY: as above.
    let name = unsafe { decode_str(name, len) };
    let mut recorder = RECORDER.lock();
    recorder.lookups.push(name.to_string());
    recorder.function(name) as *const c_void
}

extern "C" fn gen2_singleton(name: *const u8, len: u32) -> *mut c_void {
    // SAFETY: as above.
    let name = unsafe { decode_str(name, len) };
    RECORDER
        .lock()
        .singletons
        .iter()
        .rev()
        .find(|(n, _)| n == name)
        .map_or(0, |(_, addr)| *addr) as *mut c_void
}

extern "C" fn gen2_managed_address(_name: *const u8, _len: u32) -> *mut c_void {
    std::ptr::null_mut()
}

extern "C" fn gen2_set_managed_address(
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
    RECORDER.lock().address_calls.push(AddressCall {
        name: name.to_string(),
        pattern: pattern.to_string(),
        offset,
    });
}

extern "C" fn gen2_on_created(callback: gen2::StateCallback) {
    RECORDER.lock().gen2_created.push(callback);
}

extern "C" fn gen2_on_destroyed(callback: gen2::StateCallback) {
    RECORDER.lock().gen2_destroyed.push(callback);
}

extern "C" fn gen2_with_lock(callback: gen2::LockCallback, user_data: *mut c_void) {
    let runs_body = {
        let mut recorder = RECORDER.lock();
        recorder.lock_calls += 1;
        recorder.lock_runs_body
    };
    if runs_body {
        callback(user_data);
    }
}

extern "C" fn gen2_key_pressed(code: u32) -> bool {
    RECORDER.lock().keys_pressed.contains(&code)
}

extern "C" fn gen2_key_down(code: u32) -> bool {
    RECORDER.lock().keys_down.contains(&code)
}

extern "C" fn gen2_button_pressed(code: u32) -> bool {
    RECORDER.lock().buttons_pressed & code != 0
}

extern "C" fn gen2_button_down(code: u32) -> bool {
    RECORDER.lock().buttons_down & code != 0
}

extern "C" fn gen2_log(level: i32, msg: *const u8, len: u32) {
    // SAFETY: as above.
    let message = unsafe { decode_str(msg, len) };
    RECORDER.lock().logs.push(LogEntry {
        level: LogLevel::from_raw(level),
        message: message.to_string(),
        raw_len: len,
    });
}

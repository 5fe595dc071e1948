//! Benchmarks for registry lookups and the logging façade

#![expect(unsafe_code, clippy::panic, reason = "setup adopts a static table and aborts on failure")]

use std::ffi::c_void;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use luaf_abi::gen2::{CoreApiFunctions, CoreApiInput, CoreApiLua, CoreApiParam, LockCallback, StateCallback};
use luaf_abi::{LogLevel, VersionedTable};
use luaf_api::log::emit_to;
use luaf_api::{ApiSlot, ApiV2};

extern "C" fn on_frame(_delta: u64) {}

extern "C" fn add(_name: *const u8, _len: u32, _func: *const c_void) {}
extern "C" fn get(_name: *const u8, len: u32) -> *const c_void {
    // One fixed entry, matched by length.
    if len == 8 { on_frame as *const c_void } else { std::ptr::null() }
}
extern "C" fn lookup(_name: *const u8, _len: u32) -> *mut c_void {
    std::ptr::null_mut()
}
extern "C" fn set_address(_: *const u8, _: u32, _: *const u8, _: u32, _: i32) {}
extern "C" fn log(_level: i32, _msg: *const u8, _len: u32) {}
extern "C" fn subscribe(_callback: StateCallback) {}
extern "C" fn with_lock(callback: LockCallback, user_data: *mut c_void) {
    callback(user_data);
}
extern "C" fn query(_code: u32) -> bool {
    false
}

static FUNCTIONS: CoreApiFunctions = CoreApiFunctions::new(add, get, lookup, lookup, set_address);
static LUA: CoreApiLua = CoreApiLua::new(subscribe, subscribe, with_lock);
static INPUT: CoreApiInput = CoreApiInput::new(query, query, query, query);
static TABLE: CoreApiParam = CoreApiParam::new(&FUNCTIONS, log, &LUA, &INPUT);
static ENVELOPE: VersionedTable = VersionedTable::new(&TABLE);

luaf_api::function_key!(ON_FRAME: extern "C" fn(u64) = "on_frame");

fn null_api() -> &'static ApiV2 {
    let slot: &'static ApiSlot<CoreApiParam> = Box::leak(Box::new(ApiSlot::new()));
    // SAFETY: `TABLE` is a static.
    match unsafe { slot.initialize(&TABLE) } {
        Ok(api) => api,
        Err(err) => panic!("bench setup failed: {err}"),
    }
}

fn bench_lookup(c: &mut Criterion) {
    let api = null_api();

    c.bench_function("get_function", |b| {
        b.iter(|| api.get_function(black_box("on_frame")))
    });

    c.bench_function("lookup_typed", |b| b.iter(|| api.lookup(black_box(ON_FRAME))));

    c.bench_function("with_lock", |b| b.iter(|| api.lua().with_lock(|| black_box(1u32))));
}

fn bench_log(c: &mut Criterion) {
    let api = null_api();
    let long = "x".repeat(1024);

    c.bench_function("log_literal", |b| {
        b.iter(|| emit_to(api, LogLevel::Info, format_args!("plain message")))
    });

    c.bench_function("log_inline", |b| {
        b.iter(|| emit_to(api, LogLevel::Info, format_args!("frame {} took {}us", black_box(42u64), black_box(310u32))))
    });

    c.bench_function("log_spilled", |b| {
        b.iter(|| emit_to(api, LogLevel::Info, format_args!("{}", black_box(long.as_str()))))
    });
}

fn bench_envelope(c: &mut Criterion) {
    c.bench_function("envelope_check", |b| {
        b.iter(|| black_box(&ENVELOPE).table_ptr::<CoreApiParam>())
    });
}

criterion_group!(benches, bench_lookup, bench_log, bench_envelope);
criterion_main!(benches);

//! End-to-end: extensions reach an installed host through the C tables.

#![expect(unsafe_code, reason = "drives the `extern \"C\"` entry points")]

use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use luaf_abi::{ControllerButton, ControllerButtons, KeyCode, LogLevel, gen1, gen2};
use luaf_api::{ApiSlot, ApiV1, ApiV2};
use luaf_errors::HostError;
use luaf_host::{AddressRecord, CoreHost, HostConfig, MemorySink, RegionResolver};
use luaf_test_helpers::must;

struct Fixture {
    host: &'static CoreHost,
    sink: Arc<MemorySink>,
    v1: &'static ApiV1,
    v2: &'static ApiV2,
}

static IMAGE: [u8; 8] = [0xCC, 0x48, 0x89, 0x5C, 0x24, 0x08, 0xC3, 0xCC];

fn fixture() -> &'static Fixture {
    static FIXTURE: OnceLock<Fixture> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let sink = Arc::new(MemorySink::new());
        let config = must(HostConfig::builder().log_prefix("core").build());
        let host = must(must(CoreHost::with_sink(config, Arc::clone(&sink))).install());
        host.addresses().set_resolver(RegionResolver::new(&IMAGE));

        let v1_slot: &'static ApiSlot<gen1::CoreApiParam> = Box::leak(Box::new(ApiSlot::new()));
        let v2_slot: &'static ApiSlot<gen2::CoreApiParam> = Box::leak(Box::new(ApiSlot::new()));
        // SAFETY: the tables are process statics.
        let v1 = must(unsafe { v1_slot.initialize_versioned(host.envelope_v1()) });
        // SAFETY: as above.
        let v2 = must(unsafe { v2_slot.initialize_versioned(host.envelope_v2()) });
        Fixture { host, sink, v1, v2 }
    })
}

#[test]
fn test_second_install_is_rejected() {
    let fx = fixture();
    let again = must(CoreHost::new(HostConfig::default())).install();
    assert!(matches!(again, Err(HostError::AlreadyInstalled)));
    assert!(std::ptr::eq(must_installed(), fx.host));
}

fn must_installed() -> &'static CoreHost {
    luaf_test_helpers::must_some(CoreHost::installed(), "host installed")
}

#[test]
fn test_functions_shared_across_generations() {
    let fx = fixture();
    fx.v2.add_function("provider_tests::shared", 0x7000 as *const c_void);
    let via_v1 = fx.v1.get_function("provider_tests::shared");
    assert_eq!(via_v1.map(|p| p.as_ptr() as usize), Some(0x7000));
    assert!(fx.host.functions().contains("provider_tests::shared"));
    assert!(fx.v2.get_function("provider_tests::absent").is_none());
}

#[test]
fn test_log_levels_and_unknown_level() {
    let fx = fixture();
    fx.v2.log(LogLevel::Warn, "provider_tests: gen2 warn");
    fx.v1.log(LogLevel::Debug, "provider_tests: gen1 debug");
    fx.v1.log(LogLevel::Info, "");

    let records = fx.sink.records();
    assert!(records.iter().any(|r| r.level == LogLevel::Warn && r.message == "provider_tests: gen2 warn"));
    assert!(records.iter().any(|r| r.level == LogLevel::Debug && r.message == "provider_tests: gen1 debug"));
}

#[test]
fn test_lifecycle_dispatch() {
    static STATE: AtomicUsize = AtomicUsize::new(0);
    static LEGACY: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn created(state: *mut c_void) {
        STATE.store(state as usize, Ordering::SeqCst);
    }
    extern "C" fn legacy_created() {
        LEGACY.fetch_add(1, Ordering::SeqCst);
    }

    let fx = fixture();
    fx.v2.lua().on_state_created(created);
    fx.v1.on_lua_state_created(legacy_created);
    // SAFETY: the callbacks never dereference the state.
    unsafe { fx.host.dispatch_state_created(0xBEEF as *mut c_void) };

    assert_eq!(STATE.load(Ordering::SeqCst), 0xBEEF);
    assert!(LEGACY.load(Ordering::SeqCst) >= 1);
}

#[test]
fn test_with_lock_runs_under_host_lock() {
    let fx = fixture();
    let observed = fx.v2.lua().with_lock(|| fx.host.lua_lock().is_locked());
    assert_eq!(observed, Some(true));

    let nested = fx.v2.lua().with_lock(|| fx.v2.lua().with_lock(|| 5));
    assert_eq!(nested, Some(Some(5)));
}

#[test]
fn test_input_queries() {
    let fx = fixture();
    let input = fx.host.input();
    input.begin_frame();
    input.set_key(KeyCode::F9, true);
    input.set_buttons(ControllerButtons::TRIANGLE);

    let keyboard = fx.v2.input().keyboard();
    assert!(keyboard.is_pressed(KeyCode::F9));
    assert!(keyboard.is_down(KeyCode::F9));
    assert!(fx.v2.input().controller().is_down(ControllerButton::Triangle));
}

#[test]
fn test_singletons_and_managed_addresses() {
    let fx = fixture();
    fx.host
        .singletons()
        .insert("provider_tests::sCamera", 0x9000 as *mut c_void);
    let functions = fx.v2.functions();
    assert_eq!(
        functions.singleton("provider_tests::sCamera").map(|p| p.as_ptr() as usize),
        Some(0x9000)
    );
    assert!(functions.singleton("provider_tests::sNothing").is_none());

    functions.set_managed_address("provider_tests::Ctor", "48 89 5C 24 ??", 5);
    let expected = IMAGE.as_ptr() as usize + 1 + 5;
    assert_eq!(
        functions.managed_address("provider_tests::Ctor").map(|p| p.as_ptr() as usize),
        Some(expected)
    );
    assert_eq!(
        fx.host.addresses().record("provider_tests::Ctor"),
        Some(AddressRecord {
            name: "provider_tests::Ctor".to_string(),
            pattern: "48 89 5C 24 ??".to_string(),
            offset: 5,
        })
    );

    functions.set_managed_address("provider_tests::Bad", "not hex", 0);
    assert!(fx.host.addresses().record("provider_tests::Bad").is_none());
    assert!(functions.managed_address("provider_tests::Bad").is_none());
}

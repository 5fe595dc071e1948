//! Process slot behaviour: initialization rules and lookups.

#![expect(unsafe_code, reason = "slots adopt the mock provider tables")]

use std::ffi::c_void;

use luaf_api::prelude::*;
use luaf_test_helpers::serial::serial;
use luaf_test_helpers::{mock, must, must_err, must_some};

fn fresh() {
    mock::reset();
    v1::API.reset();
    v2::API.reset();
}

#[test]
fn test_initialize_null_is_argument_error() {
    let _guard = serial();
    fresh();
    // SAFETY: null is rejected before any read.
    let err = must_err(unsafe { v2::initialize(std::ptr::null()) });
    assert_eq!(err, ApiError::NullTable);
    assert!(err.is_argument_error());
}

#[test]
fn test_second_initialize_is_state_error() {
    let _guard = serial();
    fresh();
    // SAFETY: the mock table is a process-lifetime static.
    let first = must(unsafe { v2::initialize(mock::gen2_table()) });
    // SAFETY: as above.
    let err = must_err(unsafe { v2::initialize(mock::gen2_table()) });
    assert_eq!(err, ApiError::AlreadyInitialized);
    assert!(std::ptr::eq(first, must::<&_, _>(v2::get())));
}

#[test]
fn test_get_before_initialize_is_state_error() {
    let _guard = serial();
    fresh();
    let err = must_err(v1::get());
    assert_eq!(err, ApiError::NotInitialized);
    assert!(err.is_state_error());
}

#[test]
fn test_generations_have_separate_slots() {
    let _guard = serial();
    fresh();
    // SAFETY: the mock table is a process-lifetime static.
    must(unsafe { v1::initialize(mock::gen1_table()) });
    assert!(matches!(v2::get(), Err(_)));
    assert_eq!(must(v1::get()).generation(), 1);
}

#[test]
fn test_versioned_entry_validates_generation() {
    let _guard = serial();
    fresh();
    // SAFETY: the envelope is a process-lifetime static.
    let err = must_err(unsafe { v1::initialize_versioned(mock::gen2_envelope()) });
    assert!(matches!(err, ApiError::Abi(_)));
    // SAFETY: as above.
    let api = must(unsafe { v2::initialize_versioned(mock::gen2_envelope()) });
    assert_eq!(api.generation(), 2);
}

#[test]
fn test_add_function_then_get_function() {
    let _guard = serial();
    fresh();
    // SAFETY: the mock table is a process-lifetime static.
    let api = must(unsafe { v2::initialize(mock::gen2_table()) });
    api.add_function("lua_pushstring", 0xABC0 as *const c_void);
    let found = must_some(api.get_function("lua_pushstring"), "registered function");
    assert_eq!(found.as_ptr() as usize, 0xABC0);
    assert!(api.get_function("lua_pushnumber").is_none());
}

#[test]
fn test_gen1_lifecycle_subscription() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static FIRED: AtomicUsize = AtomicUsize::new(0);
    extern "C" fn on_created() {
        FIRED.fetch_add(1, Ordering::SeqCst);
    }

    let _guard = serial();
    fresh();
    // SAFETY: the mock table is a process-lifetime static.
    let api = must(unsafe { v1::initialize(mock::gen1_table()) });
    api.on_lua_state_created(on_created);
    mock::fire_gen1_created();
    assert_eq!(FIRED.load(Ordering::SeqCst), 1);
}

#[test]
fn test_gen2_lifecycle_receives_state() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static STATE: AtomicUsize = AtomicUsize::new(0);
    unsafe extern "C" fn on_created(state: *mut c_void) {
        STATE.store(state as usize, Ordering::SeqCst);
    }

    let _guard = serial();
    fresh();
    // SAFETY: the mock table is a process-lifetime static.
    let api = must(unsafe { v2::initialize(mock::gen2_table()) });
    api.lua().on_state_created(on_created);
    mock::fire_gen2_created(0x5000 as *mut c_void);
    assert_eq!(STATE.load(Ordering::SeqCst), 0x5000);
}

#[test]
fn test_initialization_is_visible_to_other_threads() {
    let _guard = serial();
    fresh();
    // SAFETY: the mock table is a process-lifetime static.
    must(unsafe { v2::initialize(mock::gen2_table()) });
    let seen = std::thread::spawn(|| v2::get().map(|api| api.generation()));
    assert!(matches!(seen.join(), Ok(Ok(2))));
}

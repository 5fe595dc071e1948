//! Logging façade: levels, lengths and failure reporting.

#![expect(unsafe_code, reason = "slots adopt the mock provider tables")]

use std::fmt;

use luaf_api::prelude::*;
use luaf_test_helpers::serial::serial;
use luaf_test_helpers::{mock, must, must_err};

fn fresh_v2() {
    mock::reset();
    v1::API.reset();
    v2::API.reset();
    // SAFETY: the mock table is a process-lifetime static.
    must(unsafe { v2::initialize(mock::gen2_table()) });
}

#[test]
fn test_before_initialize_is_state_error() {
    let _guard = serial();
    mock::reset();
    v1::API.reset();
    v2::API.reset();
    let err = must_err(luaf_api::info!("nobody is listening"));
    assert_eq!(err, ApiError::NotInitialized);
    assert!(mock::logs().is_empty());
}

#[test]
fn test_each_level_reaches_sink() {
    let _guard = serial();
    fresh_v2();
    must(luaf_api::trace!("t {}", 0));
    must(luaf_api::debug!("d {}", 1));
    must(luaf_api::info!("i {}", 2));
    must(luaf_api::warn!("w {}", 3));
    must(luaf_api::error!("e {}", 4));

    let levels: Vec<_> = mock::logs().into_iter().map(|l| l.level).collect();
    assert_eq!(
        levels,
        vec![
            Some(LogLevel::Trace),
            Some(LogLevel::Debug),
            Some(LogLevel::Info),
            Some(LogLevel::Warn),
            Some(LogLevel::Error),
        ]
    );
}

#[test]
fn test_exact_length_around_inline_capacity() {
    let _guard = serial();
    fresh_v2();
    for len in [0usize, 1, 255, 256, 257, 4096] {
        let body = "a".repeat(len);
        must(luaf_api::info!("{body}"));
    }
    let lens: Vec<u32> = mock::logs().into_iter().map(|l| l.raw_len).collect();
    assert_eq!(lens, vec![0, 1, 255, 256, 257, 4096]);
}

#[test]
fn test_literal_message_is_forwarded_verbatim() {
    let _guard = serial();
    fresh_v2();
    must(luaf_api::warn!("plain text"));
    let logs = mock::logs();
    assert_eq!(logs.first().map(|l| l.message.as_str()), Some("plain text"));
}

#[test]
fn test_display_failure_is_not_swallowed() {
    struct Broken;
    impl fmt::Display for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    let _guard = serial();
    fresh_v2();
    let err = must_err(luaf_api::error!("value: {}", Broken));
    assert_eq!(err, ApiError::Format);
    assert!(mock::logs().is_empty());
}

#[test]
fn test_falls_back_to_first_generation() {
    let _guard = serial();
    mock::reset();
    v1::API.reset();
    v2::API.reset();
    // SAFETY: the mock table is a process-lifetime static.
    must(unsafe { v1::initialize(mock::gen1_table()) });
    must(luaf_api::log!(LogLevel::Info, "via gen1 {}", 1));
    let logs = mock::logs();
    assert_eq!(logs.first().map(|l| l.message.as_str()), Some("via gen1 1"));
}

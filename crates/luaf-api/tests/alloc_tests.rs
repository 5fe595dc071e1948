//! The logging façade renders short messages without heap allocation.

use luaf_api::log::{INLINE_CAPACITY, MessageBuf};
use luaf_test_helpers::tracking::TrackingAllocator;
use luaf_test_helpers::{assert_no_alloc, must, track};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

#[test]
fn test_inline_render_does_not_allocate() {
    let name = "imgui";
    let count = 42u32;
    let guard = track();
    let buf = must(MessageBuf::render(format_args!(
        "{name} registered {count} functions"
    )));
    assert_no_alloc!(guard, "inline render");
    drop(guard);
    assert_eq!(buf.as_str(), "imgui registered 42 functions");
}

#[test]
fn test_render_at_capacity_does_not_allocate() {
    let body = "z".repeat(INLINE_CAPACITY);
    let guard = track();
    let buf = must(MessageBuf::render(format_args!("{body}")));
    assert_no_alloc!(guard, "render at capacity");
    drop(guard);
    assert!(!buf.is_spilled());
}

#[test]
fn test_render_past_capacity_allocates() {
    let body = "z".repeat(INLINE_CAPACITY + 1);
    let guard = track();
    let buf = must(MessageBuf::render(format_args!("{body}")));
    assert!(guard.has_allocations());
    drop(guard);
    assert_eq!(buf.len(), INLINE_CAPACITY + 1);
}

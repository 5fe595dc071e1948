//! Allocation tracking.
//!
//! Install [`TrackingAllocator`] as the global allocator of a test binary and
//! wrap the code under test in [`track`] to count heap allocations made on the
//! current thread.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
    static ALLOCATION_COUNT: Cell<usize> = const { Cell::new(0) };
    static ALLOCATION_BYTES: Cell<usize> = const { Cell::new(0) };
    static TRACKING_ENABLED: Cell<bool> = const { Cell::new(false) };
}

fn record(bytes: usize) {
    if TRACKING_ENABLED.with(Cell::get) {
        ALLOCATION_COUNT.with(|count| count.set(count.get().saturating_add(1)));
        ALLOCATION_BYTES.with(|total| total.set(total.get().saturating_add(bytes)));
    }
}

/// Global allocator that counts allocations while a guard is live.
pub struct TrackingAllocator;

// SAFETY: every call is forwarded unchanged to `System`.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded caller contract.
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { System.dealloc(ptr, layout) };
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: forwarded caller contract.
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() && new_size > layout.size() {
            record(new_size.saturating_sub(layout.size()));
        }
        new_ptr
    }
}

/// Counts allocations on the current thread from creation until drop.
pub struct AllocationGuard {
    start_count: usize,
    start_bytes: usize,
}

impl AllocationGuard {
    /// Start tracking.
    pub fn new() -> Self {
        TRACKING_ENABLED.with(|e| e.set(true));
        Self {
            start_count: ALLOCATION_COUNT.with(Cell::get),
            start_bytes: ALLOCATION_BYTES.with(Cell::get),
        }
    }

    /// Allocations since the guard was created.
    pub fn allocations(&self) -> usize {
        ALLOCATION_COUNT
            .with(Cell::get)
            .saturating_sub(self.start_count)
    }

    /// Bytes allocated since the guard was created.
    pub fn bytes(&self) -> usize {
        ALLOCATION_BYTES
            .with(Cell::get)
            .saturating_sub(self.start_bytes)
    }

    /// Whether anything was allocated.
    pub fn has_allocations(&self) -> bool {
        self.allocations() > 0
    }
}

impl Default for AllocationGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AllocationGuard {
    fn drop(&mut self) {
        TRACKING_ENABLED.with(|e| e.set(false));
    }
}

/// Start tracking allocations on this thread.
pub fn track() -> AllocationGuard {
    AllocationGuard::new()
}

/// Assert that a guard saw no allocations.
#[macro_export]
macro_rules! assert_no_alloc {
    ($guard:expr, $context:expr) => {{
        let guard = &$guard;
        let allocs = guard.allocations();
        if allocs > 0 {
            panic!(
                "allocation in '{}': {} allocations ({} bytes) at {}:{}",
                $context,
                allocs,
                guard.bytes(),
                file!(),
                line!()
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_counts_allocations() {
        let guard = track();
        let v: Vec<u8> = Vec::with_capacity(64);
        assert!(guard.allocations() >= 1);
        assert!(guard.bytes() >= 64);
        drop(v);
    }

    #[test]
    fn test_stack_only_code_does_not_allocate() {
        let guard = track();
        let mut buf = [0u8; 32];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = i as u8;
        }
        assert_no_alloc!(guard, "stack buffer");
        assert_eq!(buf.iter().map(|b| u32::from(*b)).sum::<u32>(), 496);
    }
}

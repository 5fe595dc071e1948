//! Interpreter lifecycle subscriptions.

#![expect(unsafe_code, reason = "invokes foreign callbacks with their context pointers")]

use std::ffi::c_void;

use luaf_abi::{gen1, gen2};
use parking_lot::Mutex;

/// Subscription lists for state creation and destruction, one pair per
/// table generation.
///
/// Dispatch copies the list before invoking, so a callback may subscribe
/// further callbacks without deadlocking; those run from the next dispatch.
#[derive(Debug, Default)]
pub struct Subscribers {
    legacy_created: Mutex<Vec<gen1::StateCallback>>,
    legacy_destroyed: Mutex<Vec<gen1::StateCallback>>,
    created: Mutex<Vec<gen2::StateCallback>>,
    destroyed: Mutex<Vec<gen2::StateCallback>>,
}

impl Subscribers {
    /// Create empty lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a first generation creation callback.
    pub fn subscribe_legacy_created(&self, callback: gen1::StateCallback) {
        self.legacy_created.lock().push(callback);
    }

    /// Subscribe a first generation destruction callback.
    pub fn subscribe_legacy_destroyed(&self, callback: gen1::StateCallback) {
        self.legacy_destroyed.lock().push(callback);
    }

    /// Subscribe a second generation creation callback.
    pub fn subscribe_created(&self, callback: gen2::StateCallback) {
        self.created.lock().push(callback);
    }

    /// Subscribe a second generation destruction callback.
    pub fn subscribe_destroyed(&self, callback: gen2::StateCallback) {
        self.destroyed.lock().push(callback);
    }

    /// Number of subscriptions across all lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.legacy_created.lock().len()
            + self.legacy_destroyed.lock().len()
            + self.created.lock().len()
            + self.destroyed.lock().len()
    }

    /// Whether there are no subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify every creation subscriber, in subscription order, second
    /// generation first.
    ///
    /// # Safety
    ///
    /// `state` must be a live interpreter state for the duration of the call.
    pub unsafe fn dispatch_created(&self, state: *mut c_void) {
        let callbacks = self.created.lock().clone();
        let legacy = self.legacy_created.lock().clone();
        tracing::debug!(
            subscribers = callbacks.len() + legacy.len(),
            "dispatching lua state created"
        );
        // SAFETY: forwarded caller contract.
        unsafe { invoke(&callbacks, state) };
        legacy.iter().for_each(|callback| callback());
    }

    /// Notify every destruction subscriber, in subscription order, second
    /// generation first.
    ///
    /// # Safety
    ///
    /// `state` must still be a live interpreter state for the duration of the
    /// call.
    pub unsafe fn dispatch_destroyed(&self, state: *mut c_void) {
        let callbacks = self.destroyed.lock().clone();
        let legacy = self.legacy_destroyed.lock().clone();
        tracing::debug!(
            subscribers = callbacks.len() + legacy.len(),
            "dispatching lua state destroyed"
        );
        // SAFETY: forwarded caller contract.
        unsafe { invoke(&callbacks, state) };
        legacy.iter().for_each(|callback| callback());
    }
}

/// # Safety
///
/// `state` must satisfy every callback's contract.
unsafe fn invoke(callbacks: &[gen2::StateCallback], state: *mut c_void) {
    for callback in callbacks {
        // SAFETY: forwarded caller contract.
        unsafe { callback(state) };
    }
}

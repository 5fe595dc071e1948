//! Serialization of tests that touch process-wide state.
//!
//! Registry slots, the installed provider and the [`mock`](crate::mock)
//! recorder are global. Tests that use them hold [`serial`] for their whole
//! body.

use parking_lot::{Mutex, MutexGuard};

static SERIAL: Mutex<()> = parking_lot::const_mutex(());

/// Take the process-wide test lock.
///
/// A test that panics while holding the lock does not poison it.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock()
}

//! Interpreter lock.

use parking_lot::ReentrantMutex;

/// Serializes access to the interpreter.
///
/// Reentrant: a body run under the lock may call back into the table and
/// take it again on the same thread.
#[derive(Debug, Default)]
pub struct LuaLock {
    inner: ReentrantMutex<()>,
}

impl LuaLock {
    /// Unlocked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `body` while holding the lock.
    pub fn run<R>(&self, body: impl FnOnce() -> R) -> R {
        let _guard = self.inner.lock();
        body()
    }

    /// Whether the lock is held by any thread.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_reentrant() {
        let lock = LuaLock::new();
        let value = lock.run(|| lock.run(|| 7));
        assert_eq!(value, 7);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_excludes_other_threads() {
        let lock = Arc::new(LuaLock::new());
        let inside = Arc::new(AtomicBool::new(false));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = Arc::clone(&lock);
                let inside = Arc::clone(&inside);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        lock.run(|| {
                            assert!(!inside.swap(true, Ordering::SeqCst));
                            inside.store(false, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            assert!(matches!(handle.join(), Ok(_)));
        }
    }
}

use std::sync::{Condvar, Mutex};

/// A latch is a primitive signalling mechanism. It starts as false, and
/// eventually someone calls `set()` and it becomes true. You can test if it
/// has been set by calling `is_set()`.
pub trait Latch {
    /// Set the latch, signalling others.
    fn set(&self);
    /// Test if the latch is set.
    fn is_set(&self) -> bool;
}

/// A latch you can block on until it becomes set. Used for one-shot
/// handshakes like worker-thread startup.
pub struct LockLatch {
    m: Mutex<bool>,
    v: Condvar,
}

impl LockLatch {
    #[inline]
    pub fn new() -> LockLatch {
        LockLatch {
            m: Mutex::new(false),
            v: Condvar::new(),
        }
    }

    /// Block until latch is set.
    pub fn wait(&self) {
        let mut guard = self.m.lock().unwrap();
        while !*guard {
            guard = self.v.wait(guard).unwrap();
        }
    }
}

impl Latch for LockLatch {
    #[inline]
    fn set(&self) {
        let mut guard = self.m.lock().unwrap();
        *guard = true;
        self.v.notify_all();
    }

    #[inline]
    fn is_set(&self) -> bool {
        let guard = self.m.lock().unwrap();
        *guard
    }
}

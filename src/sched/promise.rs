use std::sync::{Condvar, Mutex};

enum PromiseState<T> {
    NotReady,
    Ready(Option<T>),
}

/// A one-shot, blocking future. The producer calls `set` exactly once; any
/// number of consumers can `wait` for completion, and the first call to
/// `take` after completion claims the value.
///
/// Asynchronous loads hand one of these back to the caller; a synchronous
/// load is just "submit at high priority, then `wait_take`".
pub struct Promise<T> {
    m: Mutex<PromiseState<T>>,
    v: Condvar,
}

impl<T> Promise<T> {
    #[inline]
    pub fn new() -> Self {
        Promise {
            m: Mutex::new(PromiseState::NotReady),
            v: Condvar::new(),
        }
    }

    /// Creates a promise that is already resolved with `v`.
    #[inline]
    pub fn resolved(v: T) -> Self {
        Promise {
            m: Mutex::new(PromiseState::Ready(Some(v))),
            v: Condvar::new(),
        }
    }

    /// Resolves the promise, waking every waiter.
    pub fn set(&self, v: T) {
        {
            let mut guard = self.m.lock().unwrap();
            *guard = PromiseState::Ready(Some(v));
        }

        self.v.notify_all();
    }

    /// Returns true once the promise has been resolved.
    pub fn is_set(&self) -> bool {
        match *self.m.lock().unwrap() {
            PromiseState::NotReady => false,
            PromiseState::Ready(_) => true,
        }
    }

    /// Blocks the current thread until the promise is resolved.
    pub fn wait(&self) {
        let mut guard = self.m.lock().unwrap();
        while let PromiseState::NotReady = *guard {
            guard = self.v.wait(guard).unwrap();
        }
    }

    /// Claims the resolved value. Returns `None` if the promise is not
    /// resolved yet, or if the value has already been claimed.
    pub fn take(&self) -> Option<T> {
        let mut guard = self.m.lock().unwrap();
        match *guard {
            PromiseState::NotReady => None,
            PromiseState::Ready(ref mut v) => v.take(),
        }
    }

    /// Blocks until resolved, then claims the value.
    #[inline]
    pub fn wait_take(&self) -> Option<T> {
        self.wait();
        self.take()
    }
}

impl<T: Clone> Promise<T> {
    /// Returns a clone of the resolved value without claiming it.
    pub fn peek(&self) -> Option<T> {
        match *self.m.lock().unwrap() {
            PromiseState::NotReady => None,
            PromiseState::Ready(ref v) => v.clone(),
        }
    }

    /// Blocks until resolved, then returns a clone of the value.
    #[inline]
    pub fn wait_peek(&self) -> Option<T> {
        self.wait();
        self.peek()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn set_take() {
        let promise = Promise::new();
        assert!(!promise.is_set());
        assert_eq!(promise.take(), None);

        promise.set(42);
        assert!(promise.is_set());
        assert_eq!(promise.take(), Some(42));
        assert_eq!(promise.take(), None);
    }

    #[test]
    fn cross_thread() {
        let promise = Arc::new(Promise::new());
        let tx = promise.clone();
        thread::spawn(move || tx.set("done"));
        assert_eq!(promise.wait_take(), Some("done"));
    }

    #[test]
    fn peek_does_not_claim() {
        let promise = Promise::resolved(7);
        assert_eq!(promise.peek(), Some(7));
        assert_eq!(promise.peek(), Some(7));
        assert_eq!(promise.take(), Some(7));
        assert_eq!(promise.peek(), None);
    }
}

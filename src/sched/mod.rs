//! A bounded worker pool with two priority tiers.
//!
//! Loading jobs are executed by a fixed set of worker threads, sized to the
//! available hardware concurrency minus a couple of cores reserved for the
//! host's housekeeping. The pool serves two FIFO queues: `High` is for
//! blocking callers that are about to `wait` on the result, `Low` is for
//! speculative bulk loads, so interactive call sites never starve behind a
//! directory scan.
//!
//! The pool can be permanently [`pause`](Scheduler::pause)d. This is the
//! fail-stop used when archive admission failed entirely: no job would ever
//! succeed, so none are run.

pub mod latch;
pub mod promise;

pub use self::latch::{Latch, LockLatch};
pub use self::promise::Promise;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_deque as deque;

/// Cores left to the host for housekeeping tasks.
const RESERVED_CORES: usize = 2;

/// The execution priority of a job. `High` jobs are always drained before
/// any `Low` job is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Low,
}

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct Scheduler {
    shared: Arc<Shared>,
    threads: Vec<thread::JoinHandle<()>>,
}

struct Shared {
    high: Mutex<deque::Worker<Job>>,
    high_stealer: deque::Stealer<Job>,
    low: Mutex<deque::Worker<Job>>,
    low_stealer: deque::Stealer<Job>,
    watcher: Watcher,
    paused: AtomicBool,
    terminated: AtomicBool,
}

struct Watcher(Mutex<()>, Condvar);

impl Watcher {
    fn notify_all(&self) {
        let _guard = self.0.lock().unwrap();
        self.1.notify_all();
    }

    fn wait(&self) {
        let guard = self.0.lock().unwrap();
        // The timeout covers the race between a failed steal and parking;
        // a missed notification only costs one period of latency.
        let _ = self.1.wait_timeout(guard, Duration::from_millis(50)).unwrap();
    }
}

impl Scheduler {
    /// Creates a scheduler sized to the available hardware concurrency.
    pub fn new() -> Self {
        let num = thread::available_parallelism()
            .map(|v| v.get())
            .unwrap_or(4)
            .saturating_sub(RESERVED_CORES)
            .max(1);

        Scheduler::with_threads(num)
    }

    /// Creates a scheduler with exactly `num` worker threads.
    pub fn with_threads(num: usize) -> Self {
        let (high, high_stealer) = deque::fifo();
        let (low, low_stealer) = deque::fifo();

        let shared = Arc::new(Shared {
            high: Mutex::new(high),
            high_stealer,
            low: Mutex::new(low),
            low_stealer,
            watcher: Watcher(Mutex::new(()), Condvar::new()),
            paused: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        });

        let mut threads = Vec::with_capacity(num.max(1));
        let mut primed = Vec::with_capacity(num.max(1));

        for i in 0..num.max(1) {
            let shared = shared.clone();
            let latch = Arc::new(LockLatch::new());
            primed.push(latch.clone());

            let handle = thread::Builder::new()
                .name(format!("relic-worker-{}", i))
                .spawn(move || {
                    latch.set();
                    Scheduler::main_loop(&shared)
                })
                .expect("failed to spawn worker thread");

            threads.push(handle);
        }

        for latch in &primed {
            latch.wait();
        }

        Scheduler { shared, threads }
    }

    /// Enqueues a job at `priority`. Jobs enqueued onto a paused scheduler
    /// are accepted but never executed.
    pub fn spawn<F>(&self, priority: Priority, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.shared.terminated.load(Ordering::SeqCst) {
            return;
        }

        match priority {
            Priority::High => self.shared.high.lock().unwrap().push(Box::new(job)),
            Priority::Low => self.shared.low.lock().unwrap().push(Box::new(job)),
        }

        self.shared.watcher.notify_all();
    }

    /// Permanently stops job execution. Queued and future jobs are kept but
    /// never run; there is no resume.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
        self.shared.watcher.notify_all();
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    fn main_loop(shared: &Shared) {
        loop {
            if shared.terminated.load(Ordering::SeqCst) {
                return;
            }

            if !shared.paused.load(Ordering::SeqCst) {
                // High priority is always drained before low is considered.
                if let Some(job) = shared
                    .high_stealer
                    .steal()
                    .or_else(|| shared.low_stealer.steal())
                {
                    job();
                    continue;
                }
            }

            shared.watcher.wait();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shared.terminated.store(true, Ordering::SeqCst);
        self.shared.watcher.notify_all();

        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

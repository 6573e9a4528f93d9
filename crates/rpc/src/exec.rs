//! The blocking worker-execution primitive shared by the server's
//! connection-handling loop and (via `buzzblog-substrate`) the fan-out
//! request pattern (spec §4.3, §5).
//!
//! Everything in this runtime is synchronous: client stubs block on I/O,
//! servers are thread-per-connection, and "concurrency" means OS threads
//! coordinated with `Mutex`/`Condvar`. See `SPEC_FULL.md` §2 for why this
//! departs from the teacher's own async style.

use std::panic;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

type Job = Box<dyn FnOnce() + Send>;

/// A handle to a unit of work submitted to an [`Executor`]. `join` blocks
/// until the work completes and propagates a panic as an `Err`, mirroring
/// `std::thread::JoinHandle`.
pub struct TaskHandle<T> {
    rx: Receiver<thread::Result<T>>,
}

impl<T> TaskHandle<T> {
    pub fn join(self) -> thread::Result<T> {
        self.rx
            .recv()
            .expect("executor worker dropped without sending a result")
    }
}

/// Runs closures on OS threads, either unboundedly (one thread per job, used
/// when a pool size of `0` means "unlimited") or on a fixed-size pool of
/// long-lived workers.
pub enum Executor {
    Unbounded,
    Fixed(FixedPool),
}

impl Executor {
    /// `size == 0` is the server/CLI convention for "unlimited" (spec §6).
    pub fn new(size: usize) -> Self {
        if size == 0 {
            Executor::Unbounded
        } else {
            Executor::Fixed(FixedPool::new(size))
        }
    }

    pub fn spawn<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(panic::AssertUnwindSafe(f));
            // The receiver is always still alive: `TaskHandle` owns it and is
            // dropped only after `join`, which is the only way to consume it.
            let _ = tx.send(result);
        });
        match self {
            Executor::Unbounded => {
                thread::Builder::new()
                    .spawn(job)
                    .expect("failed to spawn worker thread");
            }
            Executor::Fixed(pool) => pool.submit(job),
        }
        TaskHandle { rx }
    }
}

/// A fixed set of long-lived worker threads pulling jobs off a shared queue.
pub struct FixedPool {
    sender: Sender<Job>,
    // Keeps the workers alive for the pool's lifetime; never joined
    // explicitly since services run until process exit.
    _workers: Vec<thread::JoinHandle<()>>,
}

impl FixedPool {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "fixed pool size must be positive");
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = (0..size)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                thread::Builder::new()
                    .name(format!("buzzblog-worker-{id}"))
                    .spawn(move || loop {
                        let job = {
                            let guard = receiver.lock().expect("worker pool mutex poisoned");
                            guard.recv()
                        };
                        match job {
                            Ok(job) => job(),
                            Err(_) => break, // sender dropped: pool is shutting down
                        }
                    })
                    .expect("failed to spawn pool worker")
            })
            .collect();
        FixedPool {
            sender,
            _workers: workers,
        }
    }

    fn submit(&self, job: Job) {
        self.sender
            .send(job)
            .expect("pool workers terminated unexpectedly");
    }
}

/// Caps the number of clients a server serves at once (`concurrent_client_limit`,
/// spec §4.1, §6). `0` means unlimited: `acquire` never blocks.
pub struct ConnectionLimiter {
    limit: usize,
    state: Mutex<usize>,
    cond: Condvar,
}

impl ConnectionLimiter {
    pub fn new(limit: usize) -> Arc<Self> {
        Arc::new(ConnectionLimiter {
            limit,
            state: Mutex::new(0),
            cond: Condvar::new(),
        })
    }

    /// Blocks until a serving slot is available, then returns a guard that
    /// frees the slot on drop.
    pub fn acquire(self: &Arc<Self>) -> ConnectionPermit {
        if self.limit > 0 {
            let mut count = self.state.lock().expect("connection limiter mutex poisoned");
            while *count >= self.limit {
                count = self
                    .cond
                    .wait(count)
                    .expect("connection limiter mutex poisoned");
            }
            *count += 1;
        }
        ConnectionPermit {
            limiter: Arc::clone(self),
        }
    }
}

pub struct ConnectionPermit {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        if self.limiter.limit > 0 {
            let mut count = self
                .limiter
                .state
                .lock()
                .expect("connection limiter mutex poisoned");
            *count -= 1;
            self.limiter.cond.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_pool_runs_and_joins_jobs() {
        let exec = Executor::new(2);
        let handles: Vec<_> = (0..4).map(|i| exec.spawn(move || i * 2)).collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![0, 2, 4, 6]);
    }

    #[test]
    fn unbounded_executor_runs_jobs() {
        let exec = Executor::new(0);
        let handle = exec.spawn(|| 41 + 1);
        assert_eq!(handle.join().unwrap(), 42);
    }

    #[test]
    fn panic_is_propagated_as_join_error() {
        let exec = Executor::new(1);
        let handle: TaskHandle<()> = exec.spawn(|| panic!("boom"));
        assert!(handle.join().is_err());
    }

    #[test]
    fn limiter_unlimited_never_blocks() {
        let limiter = ConnectionLimiter::new(0);
        let _a = limiter.acquire();
        let _b = limiter.acquire();
    }

    #[test]
    fn limiter_bounds_concurrency() {
        let limiter = ConnectionLimiter::new(1);
        let permit = limiter.acquire();
        drop(permit);
        let _permit2 = limiter.acquire();
    }
}

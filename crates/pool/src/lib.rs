//! A generic bounded connection pool (spec §4.2), instantiated as an
//! `RpcPool` of peer-service client stubs and a `DbPool` of database sessions
//! by `buzzblog-substrate`.
//!
//! Both variants are the same algorithm over a different connection type, so
//! there is exactly one implementation here: [`Pool<C, Ep, E>`] is generic
//! over any connection type `C`, endpoint descriptor `Ep`, and connect error
//! `E`, dialed through a boxed factory closure.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PoolError<E> {
    #[error("no endpoints configured")]
    NoEndpoints,
    #[error("failed to establish connection: {0}")]
    Connect(#[source] E),
}

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub min_size: usize,
    pub max_size: usize,
    pub allow_ephemeral: bool,
}

impl PoolConfig {
    /// `max_size == 0` disables pooling entirely (spec §4.2): every acquire
    /// dials a fresh connection and every release closes it.
    pub fn disabled(&self) -> bool {
        self.max_size == 0
    }
}

type ConnectFn<C, Ep, E> = Box<dyn Fn(&Ep) -> Result<C, E> + Send + Sync>;

struct PoolState<C> {
    current_size: usize,
    idle: VecDeque<C>,
    backlog: usize,
}

/// A bounded pool of connections of type `C`, dialed via a connect closure
/// against one of `endpoints: Vec<Ep>`.
pub struct Pool<C, Ep, E> {
    name: &'static str,
    endpoints: Vec<Ep>,
    connect: ConnectFn<C, Ep, E>,
    config: PoolConfig,
    state: Mutex<PoolState<C>>,
    cond: Condvar,
}

impl<C, Ep, E> Pool<C, Ep, E>
where
    Ep: Clone,
{
    pub fn new(
        name: &'static str,
        endpoints: Vec<Ep>,
        config: PoolConfig,
        connect: impl Fn(&Ep) -> Result<C, E> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Pool {
            name,
            endpoints,
            connect: Box::new(connect),
            config,
            state: Mutex::new(PoolState {
                current_size: 0,
                idle: VecDeque::new(),
                backlog: 0,
            }),
            cond: Condvar::new(),
        })
    }

    fn endpoint_round_robin(&self, index: usize) -> Ep {
        self.endpoints[index % self.endpoints.len()].clone()
    }

    fn endpoint_random(&self) -> Ep {
        let idx = rand::thread_rng().gen_range(0..self.endpoints.len());
        self.endpoints[idx].clone()
    }

    /// Acquires a connection, blocking the calling thread if the pool is
    /// saturated and has no ephemeral headroom (spec §4.2 acquire algorithm).
    pub fn acquire(self: &Arc<Self>) -> Result<PooledConnection<C, Ep, E>, PoolError<E>> {
        if self.endpoints.is_empty() {
            return Err(PoolError::NoEndpoints);
        }
        let started = Instant::now();

        if self.config.disabled() {
            let conn = (self.connect)(&self.endpoint_random()).map_err(PoolError::Connect)?;
            debug!(pool = self.name, wait_ms = 0, "acquired ephemeral (pool disabled)");
            return Ok(PooledConnection::new(Arc::clone(self), conn));
        }

        let mut state = self.state.lock().expect("pool mutex poisoned");
        loop {
            if state.current_size < self.config.min_size {
                let endpoint = self.endpoint_round_robin(state.current_size);
                let conn = (self.connect)(&endpoint).map_err(PoolError::Connect)?;
                state.current_size += 1;
                self.log_acquire(started, state.backlog);
                return Ok(PooledConnection::new(Arc::clone(self), conn));
            }
            if let Some(conn) = state.idle.pop_front() {
                self.log_acquire(started, state.backlog);
                return Ok(PooledConnection::new(Arc::clone(self), conn));
            }
            if state.current_size < self.config.max_size || self.config.allow_ephemeral {
                let endpoint = self.endpoint_round_robin(state.current_size);
                let conn = (self.connect)(&endpoint).map_err(PoolError::Connect)?;
                state.current_size += 1;
                self.log_acquire(started, state.backlog);
                return Ok(PooledConnection::new(Arc::clone(self), conn));
            }
            state.backlog += 1;
            state = self.cond.wait(state).expect("pool mutex poisoned");
            state.backlog = state.backlog.saturating_sub(1);
            // Loop back around: another thread may have grabbed the slot
            // that was just freed before we woke up.
        }
    }

    fn log_acquire(&self, started: Instant, backlog: usize) {
        debug!(
            pool = self.name,
            wait_ms = started.elapsed().as_secs_f64() * 1000.0,
            backlog,
            "acquired connection"
        );
    }

    /// Current `current_size` (idle + in-use), exposed for tests and metrics.
    pub fn current_size(&self) -> usize {
        self.state.lock().expect("pool mutex poisoned").current_size
    }

    pub fn idle_len(&self) -> usize {
        self.state.lock().expect("pool mutex poisoned").idle.len()
    }

    fn release(&self, conn: C) {
        if self.config.disabled() {
            drop(conn);
            return;
        }
        let mut state = self.state.lock().expect("pool mutex poisoned");
        let ephemeral_overflow = state.current_size > self.config.max_size;
        let excess_idle = state.current_size > self.config.min_size && state.idle.len() > 1;
        if ephemeral_overflow || excess_idle {
            state.current_size -= 1;
            drop(conn);
        } else {
            state.idle.push_back(conn);
            self.cond.notify_one();
        }
    }
}

/// An in-use connection borrowed from a [`Pool`]. Returned to the pool (or
/// closed, per the release algorithm) when dropped — every acquire is
/// balanced by exactly one release on every return path, including panics.
pub struct PooledConnection<C, Ep, E> {
    pool: Arc<Pool<C, Ep, E>>,
    conn: Option<C>,
}

impl<C, Ep, E> PooledConnection<C, Ep, E>
where
    Ep: Clone,
{
    fn new(pool: Arc<Pool<C, Ep, E>>, conn: C) -> Self {
        PooledConnection {
            pool,
            conn: Some(conn),
        }
    }
}

impl<C, Ep, E> std::ops::Deref for PooledConnection<C, Ep, E>
where
    Ep: Clone,
{
    type Target = C;
    fn deref(&self) -> &C {
        self.conn.as_ref().expect("connection taken before drop")
    }
}

impl<C, Ep, E> std::ops::DerefMut for PooledConnection<C, Ep, E>
where
    Ep: Clone,
{
    fn deref_mut(&mut self) -> &mut C {
        self.conn.as_mut().expect("connection taken before drop")
    }
}

impl<C, Ep, E> Drop for PooledConnection<C, Ep, E>
where
    Ep: Clone,
{
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_pool(
        min: usize,
        max: usize,
        ephemeral: bool,
    ) -> (Arc<Pool<u32, u32, anyhow::Error>>, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        let created_clone = Arc::clone(&created);
        let pool = Pool::new(
            "test",
            vec![0u32],
            PoolConfig {
                min_size: min,
                max_size: max,
                allow_ephemeral: ephemeral,
            },
            move |_ep: &u32| -> Result<u32, anyhow::Error> {
                Ok(created_clone.fetch_add(1, Ordering::SeqCst) as u32)
            },
        );
        (pool, created)
    }

    #[test]
    fn prewarms_up_to_min_size() {
        let (pool, created) = counting_pool(2, 4, false);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 2);
        assert_eq!(pool.current_size(), 2);
        drop(a);
        drop(b);
    }

    #[test]
    fn conservation_after_symmetric_acquire_release() {
        let (pool, _created) = counting_pool(1, 2, false);
        for _ in 0..5 {
            let conn = pool.acquire().unwrap();
            drop(conn);
        }
        assert_eq!(pool.current_size(), 1);
        assert_eq!(pool.idle_len(), 1);
    }

    #[test]
    fn bounded_without_ephemeral() {
        let (pool, _created) = counting_pool(0, 1, false);
        let a = pool.acquire().unwrap();
        assert_eq!(pool.current_size(), 1);
        drop(a);
        assert!(pool.current_size() <= 1);
    }

    #[test]
    fn disabled_pool_never_retains_connections() {
        let (pool, created) = counting_pool(0, 0, false);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 2);
        drop(a);
        drop(b);
        assert_eq!(pool.current_size(), 0);
        assert_eq!(pool.idle_len(), 0);
    }

    #[test]
    fn ephemeral_overflow_is_closed_on_release() {
        let (pool, _created) = counting_pool(0, 1, true);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap(); // ephemeral, beyond max_size=1
        assert_eq!(pool.current_size(), 2);
        drop(b);
        assert_eq!(pool.current_size(), 1);
        drop(a);
    }

    #[test]
    fn backpressure_wakes_a_waiter() {
        let (pool, _created) = counting_pool(1, 1, false);
        let a = pool.acquire().unwrap();
        let pool2 = Arc::clone(&pool);
        let waiter = std::thread::spawn(move || {
            let _b = pool2.acquire().unwrap();
        });
        std::thread::sleep(std::time::Duration::from_millis(50));
        drop(a);
        waiter.join().unwrap();
    }
}

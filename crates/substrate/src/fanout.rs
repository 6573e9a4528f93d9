//! The fan-out request-handling pattern (spec §4.3): a handler composing an
//! expanded view issues several independent downstream RPCs concurrently and
//! joins them before returning.

use std::sync::Arc;

use buzzblog_rpc::exec::{ConnectionLimiter, Executor};
use buzzblog_rpc::RequestMeta;

/// A reasonable default cap on concurrent sub-RPCs for one enclosing request
/// (spec §9: "cap concurrent sub-RPCs per enclosing request; 16 is a
/// reasonable default").
pub const DEFAULT_FANOUT_LIMIT: usize = 16;

/// Scoped to a single incoming request. Every [`Fanout::spawn`] call within
/// one `Fanout` shares the same bounded concurrency budget, so a `list_*`
/// call over a large page can't flood the process with one task per row.
pub struct Fanout {
    executor: Arc<Executor>,
    limiter: Arc<ConnectionLimiter>,
}

impl Fanout {
    pub fn new(executor: Arc<Executor>) -> Self {
        Self::with_limit(executor, DEFAULT_FANOUT_LIMIT)
    }

    pub fn with_limit(executor: Arc<Executor>, limit: usize) -> Self {
        Fanout {
            executor,
            limiter: ConnectionLimiter::new(limit),
        }
    }

    /// Starts `f` on a worker. `f` must carry its own [`RequestMeta`] clone
    /// (via [`RequestMeta::propagate`]) so the nested call it issues is
    /// correlated with the enclosing request — the substrate does not do
    /// this implicitly, since `f`'s signature is opaque to it.
    pub fn spawn<F, T>(&self, f: F) -> FanoutHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self.limiter.acquire();
        let handle = self.executor.spawn(move || {
            let _permit = permit;
            f()
        });
        FanoutHandle { handle }
    }
}

pub struct FanoutHandle<T> {
    handle: buzzblog_rpc::exec::TaskHandle<T>,
}

impl<T> FanoutHandle<T> {
    /// Blocks until the task completes. A sibling panic surfaces here as an
    /// error rather than poisoning the caller; joining several handles in
    /// sequence means the *first* one polled surfaces its failure first,
    /// matching spec §4.3's "first exception encountered" contract.
    pub fn get(self) -> anyhow::Result<T> {
        self.handle
            .join()
            .map_err(|_| anyhow::anyhow!("fan-out task panicked"))
    }
}

/// Convenience for the common "one call per row" list expansion (spec §4.5–
/// §4.8): runs `f` over every item in `rows` concurrently (each still bound
/// by the enclosing `Fanout`'s limit) and joins in input order, so the
/// returned `Vec` lines up index-for-index with `rows`.
pub fn expand_rows<R, T>(
    fanout: &Fanout,
    rows: Vec<R>,
    f: impl Fn(&R, &RequestMeta) -> T + Send + Sync + 'static,
    meta: &RequestMeta,
) -> anyhow::Result<Vec<T>>
where
    R: Send + 'static,
    T: Send + 'static,
{
    let f = Arc::new(f);
    let handles: Vec<_> = rows
        .into_iter()
        .map(|row| {
            let f = Arc::clone(&f);
            let meta = meta.propagate();
            fanout.spawn(move || f(&row, &meta))
        })
        .collect();
    handles.into_iter().map(FanoutHandle::get).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_in_input_order() {
        let fanout = Fanout::new(Arc::new(Executor::new(4)));
        let meta = RequestMeta::new("r1", 1);
        let rows = vec![1, 2, 3, 4, 5];
        let results = expand_rows(&fanout, rows, |row, _meta| row * 10, &meta).unwrap();
        assert_eq!(results, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn propagates_request_metadata() {
        let fanout = Fanout::new(Arc::new(Executor::new(2)));
        let meta = RequestMeta::new("correlated", 7);
        let rows = vec![()];
        let results = expand_rows(
            &fanout,
            rows,
            |_row, meta| (meta.id.clone(), meta.requester_id),
            &meta,
        )
        .unwrap();
        assert_eq!(results[0], ("correlated".to_string(), 7));
    }
}

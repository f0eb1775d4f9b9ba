//! Bounded-concurrency execution of probe tasks.
//!
//! All parallel probing (multi-host ping, port scan, subnet sweep) runs
//! through this dispatcher: an arbitrary number of tasks, at most
//! `limit` of them performing network I/O at any instant, one shared
//! lock-protected aggregate collecting results, and a join barrier that
//! releases only once every task has finished or been abandoned by its
//! own timeout.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::error;

pub struct Dispatcher {
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    pub fn new(limit: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit)),
        }
    }

    /// Runs every task and keeps the results of those that produced one.
    ///
    /// This is the scan/sweep policy: a task that fails, times out or
    /// yields `None` contributes nothing (absence means "closed" or
    /// "unreachable"), and one task's failure never cancels its
    /// siblings. Results arrive in completion order; callers sort.
    pub async fn run_collect<T, R, F, Fut>(&self, tasks: Vec<T>, op: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Option<R>> + Send,
    {
        let aggregate = Arc::new(Mutex::new(Vec::new()));
        let mut workers = JoinSet::new();

        for task in tasks {
            let permits = Arc::clone(&self.permits);
            let aggregate = Arc::clone(&aggregate);
            let op = op.clone();
            workers.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                if let Some(result) = op(task).await {
                    aggregate.lock().await.push(result);
                }
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("probe worker aborted: {e}");
            }
        }

        drain(aggregate).await
    }

    /// Runs every task and fails the whole batch if any task failed.
    ///
    /// This is the ping policy, deliberately asymmetric to
    /// [`run_collect`]: every task still runs to completion before the
    /// first error is surfaced, but an error discards the partial
    /// results instead of handing them to the caller.
    pub async fn run_all<T, R, F, Fut>(&self, tasks: Vec<T>, op: F) -> anyhow::Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<R>>> + Send,
    {
        let aggregate = Arc::new(Mutex::new(Vec::new()));
        let mut workers = JoinSet::new();

        for task in tasks {
            let permits = Arc::clone(&self.permits);
            let aggregate = Arc::clone(&aggregate);
            let op = op.clone();
            workers.spawn(async move {
                let _permit = permits.acquire_owned().await?;
                if let Some(result) = op(task).await? {
                    aggregate.lock().await.push(result);
                }
                anyhow::Ok(())
            });
        }

        let mut first_err: Option<anyhow::Error> = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    first_err.get_or_insert(e);
                }
                Err(e) => {
                    first_err.get_or_insert(e.into());
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(drain(aggregate).await),
        }
    }
}

async fn drain<R>(aggregate: Arc<Mutex<Vec<R>>>) -> Vec<R> {
    match Arc::try_unwrap(aggregate) {
        Ok(frozen) => frozen.into_inner(),
        // All workers are joined before draining; the fallback copies
        // under the lock.
        Err(shared) => shared.lock().await.drain(..).collect(),
    }
}

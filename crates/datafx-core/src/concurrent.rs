//! Background work primitives
//!
//! UI-side objects are `Rc`-based and stay on the UI thread. Work that must
//! not block it runs on a [`WorkerPool`], backed by tokio's blocking pool.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// Runs closures off the UI thread
#[derive(Clone, Debug)]
pub struct WorkerPool {
    handle: Handle,
    // Keeps an owned runtime alive for pools created outside of tokio
    _runtime: Option<Arc<Runtime>>,
}

impl WorkerPool {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            _runtime: None,
        }
    }

    /// Pool on the runtime the caller is running in
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| Error::config(format!("no tokio runtime available: {e}")))?;
        Ok(Self::new(handle))
    }

    /// Pool with its own multi-threaded runtime
    ///
    /// Must be created and dropped outside of any async context.
    pub fn owned(worker_threads: usize) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("datafx-worker")
            .enable_all()
            .build()?;
        Ok(Self {
            handle: runtime.handle().clone(),
            _runtime: Some(Arc::new(runtime)),
        })
    }

    /// Use the ambient runtime if there is one, otherwise start a small owned one
    pub fn current_or_owned() -> Result<Self> {
        Self::current().or_else(|_| Self::owned(2))
    }

    pub fn spawn_blocking<F, R>(&self, f: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.handle.spawn_blocking(f)
    }

    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_blocking_runs_on_current_runtime() {
        let pool = WorkerPool::current().unwrap();
        let result = pool.spawn_blocking(|| 21 * 2).await.unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_current_without_runtime_fails() {
        assert!(matches!(WorkerPool::current(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_owned_pool_runs_work() {
        let pool = WorkerPool::owned(1).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        pool.spawn_blocking(move || tx.send(7).unwrap());
        assert_eq!(rx.recv().unwrap(), 7);
    }
}

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

use super::error::{QuoteError, Result};

/// Handle to a spawned task that aborts the task when dropped.
///
/// Awaiting it behaves like awaiting the underlying [`JoinHandle`].
#[derive(Debug)]
pub struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> AbortOnDrop<T> {
    pub fn new(handle: JoinHandle<T>) -> Self {
        Self(handle)
    }
}

impl<T> Future for AbortOnDrop<T> {
    type Output = std::result::Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Fixed-capacity pool for upstream work.
///
/// Created once by the service owner and shared by cloning; every clone
/// draws from the same permits, so concurrent HTTP requests together never
/// run more than `capacity` jobs at a time.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerPool {
    /// # Errors
    ///
    /// `QuoteError::ConfigError` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(QuoteError::ConfigError(
                "Worker pool capacity must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held by a running job.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Spawns `job` onto the runtime; it starts once a permit is free and
    /// releases the permit when it finishes. Dropping the returned handle
    /// cancels the job and frees its permit.
    pub fn spawn<F>(&self, job: F) -> AbortOnDrop<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permits = self.permits.clone();
        AbortOnDrop::new(tokio::spawn(async move {
            // The semaphore is never closed, so acquisition only fails if that changes.
            let _permit = permits.acquire_owned().await;
            job.await
        }))
    }
}

//! Rayon thread pool sizing for running independent reports.
//!
//! Use [WorkerPool::install] to run a batch of reports with a fixed number of
//! threads, or rely on Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;

/// How many reports are extracted at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use the global Rayon pool.
    pub workers: usize,
}

impl WorkerPool {
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run a closure on a pool with this worker count. With `workers == 0`,
    /// or when a dedicated pool cannot be built, the global Rayon pool is
    /// used instead.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                tracing::warn!(
                    workers = self.workers,
                    error = %err,
                    "thread pool build failed; using global pool"
                );
                f()
            }
        }
    }
}

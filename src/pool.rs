// src/pool.rs

//! Fixed-size worker pool for the fetch and check phases
//!
//! Both phases are batches of independent tasks. [`WorkerPool::run`] returns
//! only after every task of the batch finished, which gives the barrier
//! between fetching indexes and checking targets.

use crate::error::{Error, Result};
use crate::progress::PhaseProgress;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Pool size when none is configured
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Worker pool over a dedicated rayon thread pool
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
    show_progress: bool,
}

impl WorkerPool {
    /// Create a pool of `workers` threads (at least one)
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("installcheck-worker-{i}"))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create worker pool: {e}")))?;

        Ok(Self {
            pool,
            workers,
            show_progress: false,
        })
    }

    /// Show a progress bar per phase
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` over every input and wait for all of them
    ///
    /// Results are paired with their input and keep the input order.
    pub fn run<T, R, F>(&self, label: &str, tasks: Vec<T>, task: F) -> Vec<(T, R)>
    where
        T: Send,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        let progress = PhaseProgress::new(label, tasks.len(), self.show_progress);

        let results = self.pool.install(|| {
            tasks
                .into_par_iter()
                .map(|input| {
                    let output = task(&input);
                    progress.complete();
                    (input, output)
                })
                .collect()
        });

        progress.finish();
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_runs_every_task_in_order() {
        let pool = WorkerPool::new(4).unwrap();
        let results = pool.run("Squaring", (0..100u64).collect(), |n| n * n);

        assert_eq!(results.len(), 100);
        for (i, (input, output)) in results.iter().enumerate() {
            assert_eq!(*input, i as u64);
            assert_eq!(*output, input * input);
        }
    }

    #[test]
    fn test_zero_workers_means_one() {
        let pool = WorkerPool::new(0).unwrap();
        assert_eq!(pool.workers(), 1);
        let results = pool.run("Single", vec!["a", "b"], |s| s.len());
        assert_eq!(results, vec![("a", 1), ("b", 1)]);
    }

    #[test]
    fn test_uses_pool_threads() {
        let pool = WorkerPool::new(2).unwrap();
        let names = Mutex::new(HashSet::new());

        pool.run("Naming", (0..16).collect::<Vec<_>>(), |_| {
            let name = std::thread::current().name().map(str::to_string);
            names.lock().unwrap().insert(name);
        });

        let names = names.into_inner().unwrap();
        assert!(!names.is_empty());
        assert!(names.iter().all(|n| {
            n.as_deref()
                .is_some_and(|n| n.starts_with("installcheck-worker-"))
        }));
    }

    #[test]
    fn test_phase_barrier() {
        let pool = WorkerPool::new(4).unwrap();
        let finished = AtomicUsize::new(0);

        pool.run("First", (0..32).collect::<Vec<_>>(), |_| {
            std::thread::sleep(std::time::Duration::from_millis(1));
            finished.fetch_add(1, Ordering::SeqCst);
        });

        // Every task of the first phase is done before the second starts
        let seen = pool.run("Second", (0..8).collect::<Vec<_>>(), |_| {
            finished.load(Ordering::SeqCst)
        });
        assert!(seen.iter().all(|(_, n)| *n == 32));
    }

    #[test]
    fn test_default_workers_positive() {
        assert!(default_workers() >= 1);
    }
}

// src/orchestrator.rs

//! Run driver: expand targets, fetch indexes, check targets
//!
//! A run has two phases on the same worker pool. The fetch phase downloads
//! (or reuses) every index the requested targets need; the check phase only
//! starts once all fetches finished and runs the solver for each requested
//! target. Per-target problems are logged and never abort sibling tasks.
//!
//! Two runs sharing one cache directory at the same time are not supported.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::index::{FetchMode, FetchedIndexes, IndexFetcher};
use crate::pool::{default_workers, WorkerPool};
use crate::report::ReportWriter;
use crate::solver::{self, CheckOutcome, Solver};
use crate::target::Target;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Per-run settings supplied by the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory holding the downloaded `Packages` files
    pub cache_dir: PathBuf,
    /// Directory receiving result files
    pub outdir: PathBuf,
    pub fetch_mode: FetchMode,
    /// Worker pool size; `None` uses the available parallelism
    pub workers: Option<usize>,
    pub show_progress: bool,
}

impl RunOptions {
    pub fn new(cache_dir: &Path, outdir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            outdir: outdir.to_path_buf(),
            fetch_mode: FetchMode::Download,
            workers: None,
            show_progress: false,
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub passed: Vec<Target>,
    /// Failing targets with their result file
    pub failed: Vec<(Target, PathBuf)>,
    pub skipped: Vec<Target>,
    /// Targets whose check could not be carried out
    pub errored: Vec<Target>,
    /// Indexes available after the fetch phase
    pub indexes_available: usize,
    /// Indexes that could not be fetched
    pub indexes_missing: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len() + self.skipped.len() + self.errored.len()
    }
}

/// Installability check run
pub struct InstallCheck {
    graph: DependencyGraph,
    targets: BTreeSet<Target>,
    fetcher: IndexFetcher,
    solver: Solver,
    pool: WorkerPool,
    reports: ReportWriter,
}

impl InstallCheck {
    /// Prepare a run, failing before any work if the environment is unusable
    pub fn new(config: &Config, options: RunOptions) -> Result<Self> {
        let solver = Solver::locate(&config.solver)?;
        let graph = config.dependency_graph()?;
        let targets = config.requested_targets();

        for dir in [&options.cache_dir, &options.outdir] {
            fs::create_dir_all(dir).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", dir.display()))
            })?;
        }

        let fetcher = IndexFetcher::new(
            config.repos.clone(),
            config.compression_formats()?,
            &options.cache_dir,
            options.fetch_mode,
            config.fetch.timeout(),
        )?;

        let pool = WorkerPool::new(options.workers.unwrap_or_else(default_workers))?
            .with_progress(options.show_progress);

        Ok(Self {
            graph,
            targets,
            fetcher,
            solver,
            pool,
            reports: ReportWriter::new(&options.outdir),
        })
    }

    /// Requested targets, before dependency expansion
    pub fn targets(&self) -> &BTreeSet<Target> {
        &self.targets
    }

    /// Every index the run needs
    pub fn fetch_set(&self) -> BTreeSet<Target> {
        self.graph.expand(&self.targets)
    }

    /// Execute both phases
    pub fn run(&self) -> Result<RunSummary> {
        let to_fetch = self.fetch_set();
        info!(
            "Checking {} targets, {} indexes needed, {} workers",
            self.targets.len(),
            to_fetch.len(),
            self.pool.workers()
        );
        debug!("targets: {:?}", self.targets);
        debug!("to_fetch: {:?}", to_fetch);

        let indexes = self.fetch_all(to_fetch);
        let summary = self.check_all(&indexes);

        info!(
            "{} passed, {} failed, {} skipped, {} errored",
            summary.passed.len(),
            summary.failed.len(),
            summary.skipped.len(),
            summary.errored.len()
        );
        for (target, path) in &summary.failed {
            info!("  [FAILED] {} -> {}", target, path.display());
        }

        Ok(summary)
    }

    fn fetch_all(&self, to_fetch: BTreeSet<Target>) -> FetchedIndexes {
        let label = match self.fetcher.mode() {
            FetchMode::Download => "Fetching indexes",
            FetchMode::Reuse => "Reusing indexes",
        };

        let indexes: FetchedIndexes = self
            .pool
            .run(label, to_fetch.into_iter().collect(), |target| {
                self.fetcher.fetch(target)
            })
            .into_iter()
            .collect();

        let missing = indexes.missing();
        if !missing.is_empty() {
            warn!(
                "{} of {} indexes unavailable",
                missing.len(),
                missing.len() + indexes.available()
            );
            for target in missing {
                debug!("  missing: {}", target);
            }
        }
        indexes
    }

    fn check_all(&self, indexes: &FetchedIndexes) -> RunSummary {
        let results = self.pool.run(
            "Checking installability",
            self.targets.iter().cloned().collect(),
            |target| self.check_one(target, indexes),
        );

        let mut summary = RunSummary {
            indexes_available: indexes.available(),
            indexes_missing: indexes.missing().len(),
            ..RunSummary::default()
        };

        for (target, result) in results {
            match result {
                Ok(Verdict::Passed) => summary.passed.push(target),
                Ok(Verdict::Failed(path)) => summary.failed.push((target, path)),
                Ok(Verdict::Skipped) => summary.skipped.push(target),
                Err(e) => {
                    error!("Check of {} failed: {}", target, e);
                    summary.errored.push(target);
                }
            }
        }
        summary
    }

    fn check_one(&self, target: &Target, indexes: &FetchedIndexes) -> Result<Verdict> {
        // A result from an earlier run would otherwise outlive a pass or skip
        if self.reports.clear(target)? {
            debug!("Removed stale result for {}", target);
        }

        match solver::check(&self.solver, target, &self.graph, indexes)? {
            CheckOutcome::Passed => {
                info!("  [OK] {}", target);
                Ok(Verdict::Passed)
            }
            CheckOutcome::Failed {
                output,
                exit_code,
                timed_out,
            } => {
                let timeout = timed_out.then(|| self.solver.timeout());
                let path = self.reports.write(target, &output, timeout)?;
                warn!(
                    "Installability check failed for {} (exit code {:?}), results in {}",
                    target,
                    exit_code,
                    path.display()
                );
                Ok(Verdict::Failed(path))
            }
            CheckOutcome::Skipped(reason) => {
                info!("  [SKIPPED] {}: {}", target, reason);
                Ok(Verdict::Skipped)
            }
        }
    }
}

enum Verdict {
    Passed,
    Failed(PathBuf),
    Skipped,
}

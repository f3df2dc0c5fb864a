// src/lib.rs

//! Installability checks for Debian-style repository suites
//!
//! Given a set of target suites and the suites each of them builds on,
//! `installcheck` downloads the relevant `Packages` indexes and runs an
//! external solver (`dose-debcheck`) on every target, with the target's
//! index as the focus set and its dependencies as background universes.
//!
//! # Architecture
//!
//! - `target`: coordinates (repository, distribution, suite, architecture)
//! - `graph`: declared suite dependencies and fetch-set expansion
//! - `index`: download, decompression and caching of `Packages` files
//! - `solver`: solver invocation and verdicts
//! - `orchestrator`: the two-phase run over a worker pool
//!
//! A target only gets a result file when its check fails.

pub mod compression;
pub mod config;
mod error;
pub mod graph;
pub mod index;
pub mod orchestrator;
pub mod pool;
pub mod progress;
pub mod report;
pub mod solver;
pub mod target;

pub use config::{Config, FetchConfig, SolverConfig, TargetDist, DEFAULT_CONFIG_PATH};
pub use error::{Error, Result};
pub use graph::DependencyGraph;
pub use index::{FetchMode, FetchedIndexes, IndexFetcher};
pub use orchestrator::{InstallCheck, RunOptions, RunSummary};
pub use solver::{CheckOutcome, SkipReason, Solver};
pub use target::{SuiteKey, Target};

// src/config.rs

//! Configuration file loading and validation
//!
//! The configuration declares the known repositories, the architectures to
//! test, the suites to check and the suites each of them depends on. It is
//! loaded once at startup; any malformed entry fails the whole load.
//!
//! # Names
//!
//! Repository, distribution, suite and architecture names must not contain
//! `/`, `_` or whitespace. `/` separates the parts of a suite reference and
//! `_` separates them in cache and result file names. Nested suites such as
//! `main/debian-installer` therefore cannot be checked: in a dependency list
//! `debian/main/debian-installer` reads as repository `debian`, distribution
//! `main`, suite `debian-installer`.
//!
//! # Example (TOML)
//!
//! ```toml
//! target_archs = ["amd64"]
//!
//! [repos]
//! debian = "http://deb.debian.org/debian"
//! urepo = "https://deb.utopia-repository.org"
//!
//! [[target_dists]]
//! repo = "urepo"
//! distribution = "sid"
//! suites = ["main", "meta"]
//!
//! [suite_dependencies]
//! "urepo/sid/main" = ["debian/sid/main"]
//! # Shorthand entries inherit the distribution of the key
//! "urepo/sid/meta" = ["debian/main", "urepo/main"]
//!
//! [fetch]
//! compression = ["xz", "gz"]
//! timeout_secs = 10
//!
//! [solver]
//! command = "dose-debcheck"
//! args = ["-f", "-e"]
//! background_flag = "--bg"
//! timeout_secs = 3600
//! ```

use crate::compression::CompressionFormat;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::target::{validate_identifier, SuiteKey, Target};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "installcheck.toml";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Architectures every requested suite is checked on
    pub target_archs: Vec<String>,

    /// Repository name to base URL
    pub repos: BTreeMap<String, String>,

    /// Suites to check
    #[serde(default)]
    pub target_dists: Vec<TargetDist>,

    /// `repo/dist/suite` to the suites it needs as background
    #[serde(default)]
    pub suite_dependencies: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub solver: SolverConfig,
}

/// A group of suites of one repository distribution to check
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetDist {
    pub repo: String,
    pub distribution: String,
    pub suites: Vec<String>,
}

/// Index download settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Compression extensions to try, in order
    #[serde(default = "default_compression")]
    pub compression: Vec<String>,

    /// Per-request HTTP timeout
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            compression: default_compression(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// External solver settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    /// Solver program name or path
    #[serde(default = "default_solver_command")]
    pub command: String,

    /// Arguments placed before the focus index
    #[serde(default = "default_solver_args")]
    pub args: Vec<String>,

    /// Flag preceding each background index
    #[serde(default = "default_background_flag")]
    pub background_flag: String,

    /// Kill the solver after this many seconds
    #[serde(default = "default_solver_timeout")]
    pub timeout_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            command: default_solver_command(),
            args: default_solver_args(),
            background_flag: default_background_flag(),
            timeout_secs: default_solver_timeout(),
        }
    }
}

impl SolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_compression() -> Vec<String> {
    vec!["xz".to_string(), "gz".to_string()]
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_solver_command() -> String {
    "dose-debcheck".to_string()
}

fn default_solver_args() -> Vec<String> {
    vec!["-f".to_string(), "-e".to_string()]
}

fn default_background_flag() -> String {
    "--bg".to_string()
}

fn default_solver_timeout() -> u64 {
    3600
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::parse(&content).map_err(|e| match e {
            Error::ConfigError(msg) => {
                Error::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.target_archs.is_empty() {
            return Err(Error::ConfigError("target_archs must not be empty".to_string()));
        }
        for arch in &self.target_archs {
            validate_identifier("architecture", arch)?;
        }

        for (name, base_url) in &self.repos {
            validate_identifier("repository", name)?;
            let parsed = url::Url::parse(base_url).map_err(|e| {
                Error::ConfigError(format!("Invalid URL for repository '{}': {}", name, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::ConfigError(format!(
                    "Repository '{}' must use http or https, got '{}'",
                    name,
                    parsed.scheme()
                )));
            }
        }

        for dist in &self.target_dists {
            self.require_repo(&dist.repo)?;
            validate_identifier("distribution", &dist.distribution)?;
            if dist.suites.is_empty() {
                return Err(Error::ConfigError(format!(
                    "target_dists entry {}/{} lists no suites",
                    dist.repo, dist.distribution
                )));
            }
            for suite in &dist.suites {
                validate_identifier("suite", suite)?;
            }
        }

        // Parses every key and entry
        self.dependency_graph()?;

        if self.compression_formats()?.is_empty() {
            return Err(Error::ConfigError("fetch.compression must not be empty".to_string()));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(Error::ConfigError("fetch.timeout_secs must be > 0".to_string()));
        }

        if self.solver.command.trim().is_empty() {
            return Err(Error::ConfigError("solver.command must not be empty".to_string()));
        }
        if self.solver.timeout_secs == 0 {
            return Err(Error::ConfigError("solver.timeout_secs must be > 0".to_string()));
        }

        Ok(())
    }

    /// Build the dependency graph from `suite_dependencies`
    pub fn dependency_graph(&self) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        for (key, deps) in &self.suite_dependencies {
            let suite: SuiteKey = key.parse()?;
            self.require_repo(&suite.repository)?;

            let mut parsed = Vec::with_capacity(deps.len());
            for dep in deps {
                let dep = SuiteKey::parse_dependency(dep, &suite)?;
                self.require_repo(&dep.repository)?;
                parsed.push(dep);
            }
            graph.insert(suite, parsed);
        }
        Ok(graph)
    }

    /// Every declared suite crossed with every target architecture
    pub fn requested_targets(&self) -> BTreeSet<Target> {
        let mut targets = BTreeSet::new();
        for dist in &self.target_dists {
            for suite in &dist.suites {
                for arch in &self.target_archs {
                    targets.insert(Target::new(
                        dist.repo.as_str(),
                        dist.distribution.as_str(),
                        suite.as_str(),
                        arch.as_str(),
                    ));
                }
            }
        }
        targets
    }

    /// Compression formats to try, in configured order
    pub fn compression_formats(&self) -> Result<Vec<CompressionFormat>> {
        self.fetch
            .compression
            .iter()
            .map(|name| {
                CompressionFormat::from_name(name).ok_or_else(|| {
                    Error::ConfigError(format!(
                        "Unknown compression '{}' (expected xz, gz, zst or none)",
                        name
                    ))
                })
            })
            .collect()
    }

    fn require_repo(&self, name: &str) -> Result<()> {
        if self.repos.contains_key(name) {
            Ok(())
        } else {
            Err(Error::ConfigError(format!("Unknown repository '{}'", name)))
        }
    }
}

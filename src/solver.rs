// src/solver.rs

//! Installability checks with an external solver
//!
//! The solver (`dose-debcheck` by default) is run once per target with the
//! target's index as the focus set and one background index per declared
//! dependency:
//!
//! ```text
//! dose-debcheck -f -e Packages_urepo_sid_main_amd64 --bg Packages_debian_sid_main_amd64
//! ```
//!
//! Its exit status is the verdict. Standard output is echoed live through
//! tracing and captured byte-for-byte for the result file; standard error is
//! passed through to the terminal.
//!
//! The solver runs in its own process group. On timeout the whole group is
//! killed, so helper processes forked by a wrapper script cannot keep the
//! output pipe open past the deadline.

use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::index::FetchedIndexes;
use crate::target::Target;
use std::ffi::OsString;
use std::fmt;
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::io::{BufRead, BufReader};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Why a target was not checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The target's own index is unavailable
    MissingIndex,
    /// The index of this dependency is unavailable
    MissingDependency(Target),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIndex => write!(f, "index unavailable"),
            Self::MissingDependency(dep) => write!(f, "unavailable dependency {}", dep),
        }
    }
}

/// Result of checking one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Solver exited with status zero
    Passed,
    /// Solver reported uninstallable packages, crashed or timed out
    Failed {
        /// Captured standard output, verbatim
        output: Vec<u8>,
        /// Exit code, `None` if killed by a signal or timed out
        exit_code: Option<i32>,
        timed_out: bool,
    },
    /// Solver was not run
    Skipped(SkipReason),
}

impl CheckOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Output of one solver process
#[derive(Debug)]
pub struct SolverRun {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub output: Vec<u8>,
}

/// Located solver binary plus its invocation settings
#[derive(Debug, Clone)]
pub struct Solver {
    program: PathBuf,
    args: Vec<String>,
    background_flag: String,
    timeout: Duration,
}

impl Solver {
    /// Resolve the configured solver command, failing if it is not installed
    pub fn locate(config: &SolverConfig) -> Result<Self> {
        let program = which::which(&config.command).map_err(|e| {
            Error::ToolNotFound(format!("Could not find '{}' in the PATH: {}", config.command, e))
        })?;
        debug!("Using solver {}", program.display());

        Ok(Self {
            program,
            args: config.args.clone(),
            background_flag: config.background_flag.clone(),
            timeout: config.timeout(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments for one invocation
    pub fn arguments(&self, focus: &Path, backgrounds: &[&Path]) -> Vec<OsString> {
        let mut argv: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        argv.push(focus.as_os_str().to_owned());
        for background in backgrounds {
            argv.push(OsString::from(&self.background_flag));
            argv.push(background.as_os_str().to_owned());
        }
        argv
    }

    /// Run the solver and wait for it, bounded by the configured timeout
    pub fn run(&self, label: &str, focus: &Path, backgrounds: &[&Path]) -> Result<SolverRun> {
        let argv = self.arguments(focus, backgrounds);
        info!("Running {} {:?}", self.program.display(), argv);

        let mut child = Command::new(&self.program)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .process_group(0)
            .spawn()
            .map_err(|e| {
                Error::CommandFailed(format!(
                    "Failed to spawn {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::CommandFailed("Solver stdout was not captured".to_string()))?;

        // Drain stdout concurrently so a full pipe never blocks the solver
        let prefix = label.to_string();
        let reader = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut reader = BufReader::new(stdout);
            let mut captured = Vec::new();
            let mut line = Vec::new();
            loop {
                line.clear();
                if reader.read_until(b'\n', &mut line)? == 0 {
                    break;
                }
                info!("[{}] {}", prefix, String::from_utf8_lossy(&line).trim_end());
                captured.extend_from_slice(&line);
            }
            Ok(captured)
        });

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => {
                // Leftover background processes would hold stdout open
                kill_group(&child, label);
                Some(status)
            }
            Ok(None) => {
                warn!(
                    "Solver for {} timed out after {} seconds",
                    label,
                    self.timeout.as_secs()
                );
                kill_group(&child, label);
                reap(&mut child, label);
                None
            }
            Err(e) => {
                kill_group(&child, label);
                reap(&mut child, label);
                let _ = reader.join();
                return Err(Error::CommandFailed(format!(
                    "Failed to wait for solver of {}: {}",
                    label, e
                )));
            }
        };

        let output = reader
            .join()
            .map_err(|_| Error::CommandFailed("Solver output reader panicked".to_string()))??;

        match status {
            Some(status) => {
                info!("Solver for {} exited with {}", label, status);
                Ok(SolverRun {
                    success: status.success(),
                    exit_code: status.code(),
                    timed_out: false,
                    output,
                })
            }
            None => Ok(SolverRun {
                success: false,
                exit_code: None,
                timed_out: true,
                output,
            }),
        }
    }
}

/// SIGKILL every process in the solver's group
///
/// The group id equals the solver's pid. `ESRCH` means the group is already
/// gone.
fn kill_group(child: &Child, label: &str) {
    let Ok(pid) = i32::try_from(child.id()) else {
        warn!("Solver pid {} for {} out of range", child.id(), label);
        return;
    };
    match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!("Failed to kill solver process group for {}: {}", label, e),
    }
}

fn reap(child: &mut Child, label: &str) {
    if let Err(e) = child.wait() {
        warn!("Failed to reap solver for {}: {}", label, e);
    }
}

/// Check the installability of `target` against its declared dependencies
///
/// Skips the target when its own index or any dependency index is missing;
/// a solver run with an incomplete background would report false failures.
pub fn check(
    solver: &Solver,
    target: &Target,
    graph: &DependencyGraph,
    indexes: &FetchedIndexes,
) -> Result<CheckOutcome> {
    let Some(focus) = indexes.get(target) else {
        warn!("Skipping unavailable dist {}", target);
        return Ok(CheckOutcome::Skipped(SkipReason::MissingIndex));
    };

    let mut backgrounds = Vec::new();
    for dep in graph.dependencies_of(target) {
        match indexes.get(&dep) {
            Some(path) => backgrounds.push(path),
            None => {
                warn!("Skipping dist {} due to unavailable dependency {}", target, dep);
                return Ok(CheckOutcome::Skipped(SkipReason::MissingDependency(dep)));
            }
        }
    }

    let run = solver.run(&target.to_string(), focus, &backgrounds)?;
    if run.success {
        Ok(CheckOutcome::Passed)
    } else {
        Ok(CheckOutcome::Failed {
            output: run.output,
            exit_code: run.exit_code,
            timed_out: run.timed_out,
        })
    }
}

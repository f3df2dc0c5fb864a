// src/cli.rs
//! Command-line interface definition
//!
//! Keep in sync with `build_cli()` in build.rs, which renders the man page.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "installcheck")]
#[command(author = "Installcheck Contributors")]
#[command(version)]
#[command(
    about = "Installability checker for Apt repositories, using dose-debcheck as a backend",
    long_about = "Installability checker for Apt repositories, using dose-debcheck as a backend.\n\n\
                  Packages files are downloaded into the temporary directory as \
                  Packages_REPO_DIST_SUITE_ARCH. Each failing target gets a result file \
                  Installcheck_REPO_DIST_SUITE_ARCH.txt in the output directory; \
                  passing and skipped targets get none."
)]
pub struct Cli {
    /// Directory to download Packages files into (default: a new temporary directory)
    #[arg(short, long, value_name = "DIR")]
    pub tempdir: Option<PathBuf>,

    /// Directory to write results to (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Reuse Packages files from an earlier run instead of downloading (use with --tempdir)
    #[arg(short, long)]
    pub skip_download: bool,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short, long, value_name = "N")]
    pub processes: Option<usize>,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = installcheck::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Solver command, overriding solver.command from the configuration
    #[arg(long, value_name = "CMD")]
    pub solver: Option<String>,

    /// Do not show progress bars
    #[arg(long)]
    pub no_progress: bool,
}

// src/main.rs

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use installcheck::{Config, FetchMode, InstallCheck, RunOptions};
use std::io::IsTerminal;
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(solver) = cli.solver {
        config.solver.command = solver;
    }

    let cache_dir = match cli.tempdir {
        Some(dir) => dir,
        None => tempfile::Builder::new()
            .prefix("installcheck-")
            .tempdir()
            .context("Failed to create temporary directory")?
            .keep(),
    };
    let outdir = match cli.outdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    info!("Using {} as tempdir", cache_dir.display());
    info!("Using {} as outdir", outdir.display());

    let options = RunOptions {
        cache_dir,
        outdir,
        fetch_mode: if cli.skip_download {
            FetchMode::Reuse
        } else {
            FetchMode::Download
        },
        workers: cli.processes,
        show_progress: !cli.no_progress && std::io::stderr().is_terminal(),
    };

    let check = InstallCheck::new(&config, options)?;
    let summary = check.run()?;

    println!(
        "{} targets checked: {} passed, {} failed, {} skipped, {} errored",
        summary.total(),
        summary.passed.len(),
        summary.failed.len(),
        summary.skipped.len(),
        summary.errored.len()
    );
    for (target, path) in &summary.failed {
        println!("  [FAILED] {} -> {}", target, path.display());
    }

    Ok(())
}

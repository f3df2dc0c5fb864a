// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Mirror of the derive definition in src/cli.rs
fn build_cli() -> Command {
    Command::new("installcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Installcheck Contributors")
        .about("Installability checker for Apt repositories, using dose-debcheck as a backend")
        .arg(
            Arg::new("tempdir")
                .short('t')
                .long("tempdir")
                .value_name("DIR")
                .help("Directory to download Packages files into (default: a new temporary directory)"),
        )
        .arg(
            Arg::new("outdir")
                .short('o')
                .long("outdir")
                .value_name("DIR")
                .help("Directory to write results to (default: current directory)"),
        )
        .arg(
            Arg::new("skip_download")
                .short('s')
                .long("skip-download")
                .action(ArgAction::SetTrue)
                .help("Reuse Packages files from an earlier run instead of downloading"),
        )
        .arg(
            Arg::new("processes")
                .short('p')
                .long("processes")
                .value_name("N")
                .help("Number of worker threads (default: number of CPU cores)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .default_value("installcheck.toml")
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("solver")
                .long("solver")
                .value_name("CMD")
                .help("Solver command, overriding solver.command from the configuration"),
        )
        .arg(
            Arg::new("no_progress")
                .long("no-progress")
                .action(ArgAction::SetTrue)
                .help("Do not show progress bars"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("installcheck.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}

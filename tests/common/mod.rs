// tests/common/mod.rs

//! Shared test utilities for end-to-end runs against a mock repository.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use installcheck::{Config, FetchMode, RunOptions};
use mockito::{Mock, ServerGuard};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const UREPO_MAIN: &str = "Package: urepo-hello\nVersion: 1.0\nDepends: libc6\n";
pub const DEBIAN_MAIN: &str = "Package: libc6\nVersion: 2.37-1\n";

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn xz(data: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Scratch directories for one run
///
/// Keep the struct alive for the duration of the test to prevent cleanup.
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.path().join("cache")
    }

    pub fn outdir(&self) -> PathBuf {
        self.root.path().join("out")
    }

    /// Write a shell script used as the solver
    pub fn solver_script(&self, body: &str) -> PathBuf {
        let path = self.root.path().join("solver.sh");
        fs::write(&path, body).unwrap();
        path
    }

    pub fn options(&self, mode: FetchMode) -> RunOptions {
        let mut options = RunOptions::new(&self.cache_dir(), &self.outdir());
        options.fetch_mode = mode;
        options.workers = Some(2);
        options
    }
}

pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// `(urepo, sid, main) -> [(debian, sid, main)]` on amd64, both repos served
/// by `server`, solver run as `sh <script>`
pub fn single_dependency_config(server: &ServerGuard, script: &Path) -> Config {
    Config::parse(&format!(
        r#"
target_archs = ["amd64"]

[repos]
debian = "{url}/debian"
urepo = "{url}/urepo"

[[target_dists]]
repo = "urepo"
distribution = "sid"
suites = ["main"]

[suite_dependencies]
"urepo/sid/main" = ["debian/sid/main"]

[fetch]
timeout_secs = 5

[solver]
command = "sh"
args = ["{script}"]
timeout_secs = 30
"#,
        url = server.url(),
        script = script.display()
    ))
    .unwrap()
}

/// Serve urepo/sid/main as Packages.xz
pub fn serve_urepo_main(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/urepo/dists/sid/main/binary-amd64/Packages.xz")
        .with_status(200)
        .with_body(xz(UREPO_MAIN.as_bytes()))
        .create()
}

/// Serve debian/sid/main only as Packages.gz
pub fn serve_debian_main(server: &mut ServerGuard) -> Vec<Mock> {
    vec![
        server
            .mock("GET", "/debian/dists/sid/main/binary-amd64/Packages.xz")
            .with_status(404)
            .create(),
        server
            .mock("GET", "/debian/dists/sid/main/binary-amd64/Packages.gz")
            .with_status(200)
            .with_body(gzip(DEBIAN_MAIN.as_bytes()))
            .create(),
    ]
}

/// Every extension of debian/sid/main is missing
pub fn debian_main_not_found(server: &mut ServerGuard) -> Vec<Mock> {
    ["xz", "gz"]
        .iter()
        .map(|ext| {
            server
                .mock(
                    "GET",
                    format!("/debian/dists/sid/main/binary-amd64/Packages.{ext}").as_str(),
                )
                .with_status(404)
                .create()
        })
        .collect()
}

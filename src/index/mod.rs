// src/index/mod.rs

//! `Packages` index fetching and the on-disk index cache
//!
//! Every [`Target`] maps to a fixed file in the cache directory, so a run in
//! [`FetchMode::Reuse`] can pick up the files of a previous download run.
//! Fetch failures are never fatal: they are logged and the target is
//! recorded as absent in [`FetchedIndexes`].

mod client;

pub use client::IndexClient;
pub(crate) use client::partial_path;

use crate::compression::CompressionFormat;
use crate::error::Result;
use crate::target::Target;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Whether indexes are downloaded or taken from a previous run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Download from the repository
    #[default]
    Download,
    /// No network access; reuse files already in the cache directory
    Reuse,
}

/// Remote URL of a target's index, without compression extension
///
/// Example: `http://deb.debian.org/debian/dists/sid/main/binary-amd64/Packages`
pub fn index_url(base_url: &str, target: &Target) -> String {
    format!(
        "{}/dists/{}/{}/binary-{}/Packages",
        base_url.trim_end_matches('/'),
        target.distribution,
        target.suite,
        target.architecture
    )
}

/// Cache file name of a target's index
pub fn index_file_name(target: &Target) -> String {
    format!("Packages_{}", target.file_stem())
}

/// Downloads indexes into the cache directory
pub struct IndexFetcher {
    client: IndexClient,
    base_urls: BTreeMap<String, String>,
    formats: Vec<CompressionFormat>,
    cache_dir: PathBuf,
    mode: FetchMode,
}

impl IndexFetcher {
    pub fn new(
        base_urls: BTreeMap<String, String>,
        formats: Vec<CompressionFormat>,
        cache_dir: &Path,
        mode: FetchMode,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: IndexClient::new(timeout)?,
            base_urls,
            formats,
            cache_dir: cache_dir.to_path_buf(),
            mode,
        })
    }

    /// Deterministic cache location of a target's index
    pub fn local_path(&self, target: &Target) -> PathBuf {
        self.cache_dir.join(index_file_name(target))
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Fetch one index, returning its local path or `None` if unavailable
    pub fn fetch(&self, target: &Target) -> Option<PathBuf> {
        let dest = self.local_path(target);

        match self.mode {
            FetchMode::Reuse => {
                if dest.is_file() {
                    info!("Reusing Packages file {}", dest.display());
                    Some(dest)
                } else {
                    warn!(
                        "Missing Packages file {}; checks needing {} will be skipped",
                        dest.display(),
                        target
                    );
                    None
                }
            }
            FetchMode::Download => self.download(target, &dest),
        }
    }

    fn download(&self, target: &Target, dest: &Path) -> Option<PathBuf> {
        let Some(base_url) = self.base_urls.get(&target.repository) else {
            warn!("No base URL for repository '{}'; skipping {}", target.repository, target);
            return None;
        };
        let url = index_url(base_url, target);

        for format in &self.formats {
            let candidate = format!("{}{}", url, format.extension());
            match self.client.download_decompressed(&candidate, *format, dest) {
                Ok(bytes) => {
                    info!("Fetched {} ({} bytes)", candidate, bytes);
                    return Some(dest.to_path_buf());
                }
                Err(e) => {
                    warn!("Could not fetch {}: {}", candidate, e);
                }
            }
        }

        warn!("Failed to download any Packages file for {}", target);
        None
    }
}

/// Write-once map of fetch results, built after the fetch phase completed
#[derive(Debug, Clone, Default)]
pub struct FetchedIndexes {
    paths: HashMap<Target, Option<PathBuf>>,
}

impl FetchedIndexes {
    /// Local index of `target`, or `None` if it was not fetched
    pub fn get(&self, target: &Target) -> Option<&Path> {
        self.paths.get(target).and_then(|p| p.as_deref())
    }

    /// Number of targets with an index on disk
    pub fn available(&self) -> usize {
        self.paths.values().filter(|p| p.is_some()).count()
    }

    /// Targets whose fetch failed or was skipped
    pub fn missing(&self) -> Vec<&Target> {
        let mut missing: Vec<_> = self
            .paths
            .iter()
            .filter(|(_, p)| p.is_none())
            .map(|(t, _)| t)
            .collect();
        missing.sort();
        missing
    }
}

impl FromIterator<(Target, Option<PathBuf>)> for FetchedIndexes {
    fn from_iter<I: IntoIterator<Item = (Target, Option<PathBuf>)>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

// src/index/client.rs

//! HTTP client for `Packages` index downloads
//!
//! Wraps a blocking reqwest client. Responses are decompressed while they
//! stream to disk and only renamed into place once the decoder reached the
//! end of the stream.

use crate::compression::{create_decoder, CompressionError, CompressionFormat};
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// HTTP client for index downloads
pub struct IndexClient {
    client: Client,
}

impl IndexClient {
    /// Create a client whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("installcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Download `url`, decompress it as `format` and store it at `dest_path`
    ///
    /// Returns the number of decompressed bytes written. On any error the
    /// partial file is removed and `dest_path` is left untouched.
    pub fn download_decompressed(
        &self,
        url: &str,
        format: CompressionFormat,
        dest_path: &Path,
    ) -> Result<u64> {
        debug!("Fetching {} ({})", url, format);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        let temp_path = partial_path(dest_path);
        let written = match write_decoded(response, format, &temp_path) {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        };

        // Atomic rename from temp to final destination
        fs::rename(&temp_path, dest_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            Error::IoError(format!(
                "Failed to move {} to {}: {e}",
                temp_path.display(),
                dest_path.display()
            ))
        })?;

        Ok(written)
    }
}

/// `<dest>.part`, next to the final file so the rename stays on one filesystem
pub(crate) fn partial_path(dest_path: &Path) -> PathBuf {
    let mut name = OsString::from(dest_path.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

fn write_decoded(
    response: reqwest::blocking::Response,
    format: CompressionFormat,
    temp_path: &Path,
) -> Result<u64> {
    let mut decoder = create_decoder(response, format)?;
    let mut file = File::create(temp_path).map_err(|e| {
        Error::IoError(format!("Failed to create file {}: {e}", temp_path.display()))
    })?;

    // Read errors here are either truncated transfers or corrupt data;
    // both surface through the decoder
    let written = io::copy(&mut decoder, &mut file).map_err(|e| CompressionError::Decompression {
        format: format.name(),
        source: e,
    })?;

    file.flush()?;
    file.sync_all()?;
    Ok(written)
}

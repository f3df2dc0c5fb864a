// src/compression/mod.rs
//! Decompression of `Packages` index downloads
//!
//! Debian archives publish each index in several compressed variants
//! (`Packages.xz`, `Packages.gz`, sometimes `Packages.zst` or the plain
//! `Packages`). This module maps those variants to streaming decoders.

use std::io::{self, Read};
use thiserror::Error;

/// Compression-related errors
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Failed to create {format} decoder: {source}")]
    DecoderCreation {
        format: &'static str,
        source: io::Error,
    },

    #[error("Failed to decompress {format} data: {source}")]
    Decompression {
        format: &'static str,
        source: io::Error,
    },
}

/// Compressed variants of a `Packages` index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Uncompressed `Packages`
    None,
    /// `Packages.gz`
    Gzip,
    /// `Packages.xz`
    Xz,
    /// `Packages.zst`
    Zstd,
}

impl CompressionFormat {
    /// Parse a configuration name (`xz`, `gz`, `zst`, `none`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "xz" => Some(Self::Xz),
            "gz" | "gzip" => Some(Self::Gzip),
            "zst" | "zstd" => Some(Self::Zstd),
            "none" | "" => Some(Self::None),
            _ => None,
        }
    }

    /// Suffix appended to the index URL
    pub fn extension(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Gzip => ".gz",
            Self::Xz => ".xz",
            Self::Zstd => ".zst",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }
}

impl std::fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Wrap `reader` in a decoder for `format`
///
/// For `CompressionFormat::None` the reader is returned unchanged.
pub fn create_decoder<'a, R: Read + 'a>(
    reader: R,
    format: CompressionFormat,
) -> Result<Box<dyn Read + 'a>, CompressionError> {
    match format {
        CompressionFormat::None => Ok(Box::new(reader)),
        // Concatenated gzip members form one stream
        CompressionFormat::Gzip => Ok(Box::new(flate2::read::MultiGzDecoder::new(reader))),
        CompressionFormat::Xz => Ok(Box::new(xz2::read::XzDecoder::new(reader))),
        CompressionFormat::Zstd => {
            let decoder = zstd::Decoder::new(reader).map_err(|e| CompressionError::DecoderCreation {
                format: "zstd",
                source: e,
            })?;
            Ok(Box::new(decoder))
        }
    }
}

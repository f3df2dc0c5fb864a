// src/report.rs

//! Result files for failing targets
//!
//! Only failures produce a file; a missing file means the target passed or
//! was skipped. Files are named from the target coordinate:
//! `Installcheck_urepo_sid_main_amd64.txt`.

use crate::error::{Error, Result};
use crate::index::partial_path;
use crate::target::Target;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Header line identifying the checked target
pub fn header(target: &Target) -> String {
    format!("Results for {}:\n", target)
}

/// Writes and clears result files in the output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    outdir: PathBuf,
}

impl ReportWriter {
    pub fn new(outdir: &Path) -> Self {
        Self {
            outdir: outdir.to_path_buf(),
        }
    }

    /// Result file location for `target`
    pub fn path_for(&self, target: &Target) -> PathBuf {
        self.outdir
            .join(format!("Installcheck_{}.txt", target.file_stem()))
    }

    /// Remove a result file left by an earlier run
    ///
    /// Returns whether a file was removed.
    pub fn clear(&self, target: &Target) -> Result<bool> {
        let path = self.path_for(target);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::IoError(format!(
                "Failed to remove stale result {}: {e}",
                path.display()
            ))),
        }
    }

    /// Write the header followed by the captured solver output
    ///
    /// When the solver was killed on timeout, a trailing note records it.
    pub fn write(
        &self,
        target: &Target,
        output: &[u8],
        timed_out_after: Option<Duration>,
    ) -> Result<PathBuf> {
        let path = self.path_for(target);
        let temp_path = partial_path(&path);

        let written = (|| -> io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(header(target).as_bytes())?;
            file.write_all(output)?;
            if let Some(timeout) = timed_out_after {
                if !output.is_empty() && !output.ends_with(b"\n") {
                    file.write_all(b"\n")?;
                }
                writeln!(
                    file,
                    "installcheck: solver timed out after {} seconds",
                    timeout.as_secs()
                )?;
            }
            file.sync_all()?;
            fs::rename(&temp_path, &path)
        })();

        written.map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            Error::IoError(format!("Failed to write result {}: {e}", path.display()))
        })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for() {
        let writer = ReportWriter::new(Path::new("/srv/results"));
        let target = Target::new("urepo", "sid", "main", "amd64");
        assert_eq!(
            writer.path_for(&target),
            PathBuf::from("/srv/results/Installcheck_urepo_sid_main_amd64.txt")
        );
    }

    #[test]
    fn test_write_header_and_verbatim_output() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let target = Target::new("urepo", "sid", "main", "amd64");
        let output = b"conflict: pkgA vs pkgB\n\xff raw bytes";

        let path = writer.write(&target, output, None).unwrap();

        let mut expected = b"Results for urepo/sid/main/amd64:\n".to_vec();
        expected.extend_from_slice(output);
        assert_eq!(fs::read(&path).unwrap(), expected);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_timeout_note() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let target = Target::new("urepo", "sid", "main", "amd64");

        let path = writer
            .write(&target, b"partial", Some(Duration::from_secs(60)))
            .unwrap();
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "Results for urepo/sid/main/amd64:\npartial\ninstallcheck: solver timed out after 60 seconds\n"
        );
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let target = Target::new("urepo", "sid", "main", "amd64");

        assert!(!writer.clear(&target).unwrap());
        writer.write(&target, b"x", None).unwrap();
        assert!(writer.clear(&target).unwrap());
        assert!(!writer.path_for(&target).exists());
    }
}

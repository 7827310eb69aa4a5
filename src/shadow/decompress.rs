// src/shadow/decompress.rs

//! Decompress pass: materialize verified shadows

use super::{FileError, FileOp, PassReport, ShadowTree, occupied};
use crate::compression::{RoundTripDecoder, RoundTripError};
use crate::error::Result;
use crate::progress::{ProgressTracker, SilentProgress};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// What the decompress pass did with one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressOutcome {
    /// A verified shadow now exists
    Created,
    /// Decoded fine but does not round-trip; the shadow was discarded
    RolledBack,
    /// Plain file, nothing to do
    NotGzip,
    /// Already a shadow, or already shadowed
    Skipped,
}

impl ShadowTree {
    /// Create shadows for every transparently recompressible gzip file
    pub fn decompress_all(&self) -> Result<PassReport> {
        self.decompress_all_with_progress(&SilentProgress::new())
    }

    /// Decompress pass reporting one step per candidate file
    pub fn decompress_all_with_progress(&self, progress: &dyn ProgressTracker) -> Result<PassReport> {
        let mut report = PassReport::default();
        let candidates = self.snapshot(&mut report)?;
        report.candidates = candidates.len();
        progress.set_length(candidates.len() as u64);

        for path in candidates {
            progress.set_message(&self.display_name(&path));
            match self.decompress_file(&path) {
                Ok(outcome) => report.record_decompress(outcome),
                Err(err) => self.record_error(&mut report, err)?,
            }
            progress.increment(1);
        }

        info!("Decompress pass over {}: {}", self.root.display(), report);
        Ok(report)
    }

    /// Try to materialize the shadow of a single file
    ///
    /// The shadow is written to a temporary file in the same directory and
    /// only moved into place once the stream is known to round-trip, so a
    /// partially written or untrustworthy shadow is never visible.
    pub fn decompress_file(&self, path: &Path) -> std::result::Result<DecompressOutcome, FileError> {
        if self.is_shadow(path) {
            return Ok(DecompressOutcome::Skipped);
        }
        let shadow = self.shadow_path(path);
        if occupied(&shadow).map_err(|e| FileError::io(&shadow, FileOp::Stat, e))? {
            debug!("Shadow already present: {}", shadow.display());
            return Ok(DecompressOutcome::Skipped);
        }

        let source = File::open(path).map_err(|e| FileError::io(path, FileOp::Open, e))?;
        let permissions = source
            .metadata()
            .map_err(|e| FileError::io(path, FileOp::Stat, e))?
            .permissions();

        let mut decoder = match RoundTripDecoder::new(source, &self.params) {
            Ok(decoder) => decoder,
            Err(RoundTripError::NotAGzipStream) => {
                debug!("Not gzip: {}", path.display());
                return Ok(DecompressOutcome::NotGzip);
            }
            Err(e) => return Err(FileError::new(path, FileOp::Decode, e)),
        };

        let dir = shadow.parent().unwrap_or(&self.root);
        let mut staged = self
            .staging_file(dir)
            .map_err(|e| FileError::io(&shadow, FileOp::Create, e))?;

        let mut buf = vec![0u8; self.params.buffer_size];
        loop {
            let n = decoder
                .read(&mut buf)
                .map_err(|e| FileError::new(path, FileOp::Decode, RoundTripError::from_decode(e)))?;
            if n == 0 {
                break;
            }
            staged
                .write_all(&buf[..n])
                .map_err(|e| FileError::io(&shadow, FileOp::Write, e))?;
        }
        staged
            .as_file()
            .sync_all()
            .map_err(|e| FileError::io(&shadow, FileOp::Write, e))?;

        let verdict = decoder.finish();
        if !verdict.transparent {
            // Dropping the staged file removes it
            info!(
                "Not transparently recompressible, discarding shadow: {}",
                path.display()
            );
            return Ok(DecompressOutcome::RolledBack);
        }

        fs::set_permissions(staged.path(), permissions)
            .map_err(|e| FileError::io(&shadow, FileOp::Write, e))?;
        staged
            .persist_noclobber(&shadow)
            .map_err(|e| FileError::io(&shadow, FileOp::Persist, e.error))?;

        info!(
            "Created shadow {} ({} -> {} bytes)",
            shadow.display(),
            verdict.compressed_len,
            verdict.plaintext_len
        );
        Ok(DecompressOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::{GzipParams, compress};
    use tempfile::TempDir;

    fn gzip(data: &[u8]) -> Vec<u8> {
        compress(data, &GzipParams::default()).unwrap()
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_decompress_file_creates_shadow() {
        let temp = TempDir::new().unwrap();
        let tree = ShadowTree::new(temp.path()).unwrap();
        let original = temp.path().join("layer");
        std::fs::write(&original, gzip(b"layer contents")).unwrap();

        let outcome = tree.decompress_file(&original).unwrap();
        assert_eq!(outcome, DecompressOutcome::Created);

        let shadow = tree.shadow_path(&original);
        assert_eq!(std::fs::read(&shadow).unwrap(), b"layer contents");
        // No staging leftovers
        assert_eq!(file_names(temp.path()), vec!["layer", "layer_UNGZIPPED_BY_BOOSTER"]);
    }

    #[test]
    fn test_decompress_file_skips() {
        let temp = TempDir::new().unwrap();
        let tree = ShadowTree::new(temp.path()).unwrap();
        let original = temp.path().join("layer");
        std::fs::write(&original, gzip(b"data")).unwrap();
        let shadow = tree.shadow_path(&original);
        std::fs::write(&shadow, b"existing").unwrap();

        assert_eq!(tree.decompress_file(&original).unwrap(), DecompressOutcome::Skipped);
        assert_eq!(tree.decompress_file(&shadow).unwrap(), DecompressOutcome::Skipped);
        // The existing shadow is untouched
        assert_eq!(std::fs::read(&shadow).unwrap(), b"existing");
    }

    #[test]
    fn test_decompress_file_plain_and_empty() {
        let temp = TempDir::new().unwrap();
        let tree = ShadowTree::new(temp.path()).unwrap();
        let plain = temp.path().join("notes.txt");
        let empty = temp.path().join("empty");
        std::fs::write(&plain, b"plain text").unwrap();
        std::fs::write(&empty, b"").unwrap();

        assert_eq!(tree.decompress_file(&plain).unwrap(), DecompressOutcome::NotGzip);
        assert_eq!(tree.decompress_file(&empty).unwrap(), DecompressOutcome::NotGzip);
        assert_eq!(file_names(temp.path()), vec!["empty", "notes.txt"]);
    }

    #[test]
    fn test_decompress_file_rolls_back() {
        let temp = TempDir::new().unwrap();
        let tree = ShadowTree::new(temp.path()).unwrap();
        let original = temp.path().join("foreign.gz");
        let foreign = compress(
            &b"produced by another encoder ".repeat(500),
            &GzipParams {
                level: 9,
                mtime: 1_600_000_000,
                ..GzipParams::default()
            },
        )
        .unwrap();
        std::fs::write(&original, foreign).unwrap();

        assert_eq!(tree.decompress_file(&original).unwrap(), DecompressOutcome::RolledBack);
        assert_eq!(file_names(temp.path()), vec!["foreign.gz"]);
    }

    #[test]
    fn test_decompress_file_corrupt() {
        let temp = TempDir::new().unwrap();
        let tree = ShadowTree::new(temp.path()).unwrap();
        let original = temp.path().join("broken.gz");
        let data = gzip(&b"0123456789".repeat(1000));
        std::fs::write(&original, &data[..data.len() / 2]).unwrap();

        let err = tree.decompress_file(&original).unwrap_err();
        assert_eq!(err.op, FileOp::Decode);
        assert!(err.is_corrupt());
        assert_eq!(err.path, original);
        assert_eq!(file_names(temp.path()), vec!["broken.gz"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_shadow_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tree = ShadowTree::new(temp.path()).unwrap();
        let original = temp.path().join("layer");
        std::fs::write(&original, gzip(b"data")).unwrap();
        std::fs::set_permissions(&original, std::fs::Permissions::from_mode(0o640)).unwrap();

        tree.decompress_file(&original).unwrap();
        let mode = std::fs::metadata(tree.shadow_path(&original))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}

// src/shadow/report.rs

//! Per-pass results and per-file errors

use super::{DecompressOutcome, RecompressOutcome};
use crate::compression::RoundTripError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The step of per-file processing that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Walk,
    Stat,
    Open,
    Decode,
    Create,
    Write,
    Compress,
    Persist,
}

impl FileOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Stat => "stat",
            Self::Open => "open",
            Self::Decode => "decode",
            Self::Create => "create",
            Self::Write => "write",
            Self::Compress => "compress",
            Self::Persist => "persist",
        }
    }
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A failure scoped to a single file of a pass
#[derive(Error, Debug)]
#[error("{op} failed for {}: {source}", .path.display())]
pub struct FileError {
    pub path: PathBuf,
    pub op: FileOp,
    #[source]
    pub source: RoundTripError,
}

impl FileError {
    pub fn new(path: impl AsRef<Path>, op: FileOp, source: RoundTripError) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            op,
            source,
        }
    }

    /// Filesystem-level failure
    pub fn io(path: impl AsRef<Path>, op: FileOp, err: io::Error) -> Self {
        Self::new(path, op, RoundTripError::Io(err))
    }

    /// True if the file held a gzip stream that failed mid-decode
    pub fn is_corrupt(&self) -> bool {
        matches!(self.source, RoundTripError::CorruptStream(_))
    }
}

/// Summary of one pass over a tree
#[derive(Debug, Default)]
pub struct PassReport {
    /// Files considered after the snapshot walk
    pub candidates: usize,
    /// Shadows materialized (decompress pass)
    pub created: usize,
    /// Originals rebuilt from shadows (recompress pass)
    pub regenerated: usize,
    /// Shadows discarded because the stream did not round-trip
    pub rolled_back: usize,
    /// Plain files left alone
    pub not_gzip: usize,
    /// Files with nothing to do (already shadowed, original present)
    pub skipped: usize,
    /// Per-file failures; the pass continued past each of them
    pub errors: Vec<FileError>,
}

impl PassReport {
    /// True if no file failed
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn record_decompress(&mut self, outcome: DecompressOutcome) {
        match outcome {
            DecompressOutcome::Created => self.created += 1,
            DecompressOutcome::RolledBack => self.rolled_back += 1,
            DecompressOutcome::NotGzip => self.not_gzip += 1,
            DecompressOutcome::Skipped => self.skipped += 1,
        }
    }

    pub(crate) fn record_recompress(&mut self, outcome: RecompressOutcome) {
        match outcome {
            RecompressOutcome::Regenerated => self.regenerated += 1,
            RecompressOutcome::OriginalPresent | RecompressOutcome::NotShadow => {
                self.skipped += 1
            }
        }
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates: {} created, {} regenerated, {} rolled back, {} not gzip, {} skipped, {} errors",
            self.candidates,
            self.created,
            self.regenerated,
            self.rolled_back,
            self.not_gzip,
            self.skipped,
            self.errors.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_display() {
        let err = FileError::io(
            "/srv/registry/blob",
            FileOp::Open,
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("open failed for /srv/registry/blob"));
        assert!(msg.contains("denied"));
        assert!(!err.is_corrupt());

        let corrupt = FileError::new(
            "blob",
            FileOp::Decode,
            RoundTripError::CorruptStream(io::ErrorKind::UnexpectedEof.into()),
        );
        assert!(corrupt.is_corrupt());
    }

    #[test]
    fn test_report_counters() {
        let mut report = PassReport::default();
        report.record_decompress(DecompressOutcome::Created);
        report.record_decompress(DecompressOutcome::NotGzip);
        report.record_decompress(DecompressOutcome::NotGzip);
        report.record_decompress(DecompressOutcome::RolledBack);
        report.record_recompress(RecompressOutcome::Regenerated);
        report.record_recompress(RecompressOutcome::OriginalPresent);

        assert_eq!(report.created, 1);
        assert_eq!(report.not_gzip, 2);
        assert_eq!(report.rolled_back, 1);
        assert_eq!(report.regenerated, 1);
        assert_eq!(report.skipped, 1);
        assert!(report.is_clean());
        assert!(report.to_string().contains("1 created"));
    }
}

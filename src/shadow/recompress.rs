// src/shadow/recompress.rs

//! Recompress pass: rebuild originals that disappeared

use super::{FileError, FileOp, PassReport, ShadowTree, occupied};
use crate::compression::compress_stream;
use crate::error::Result;
use crate::progress::{ProgressTracker, SilentProgress};
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

/// What the recompress pass did with one shadow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecompressOutcome {
    /// The original was rebuilt from the shadow
    Regenerated,
    /// The original exists; nothing to do
    OriginalPresent,
    /// The path is not a shadow
    NotShadow,
}

impl ShadowTree {
    /// Regenerate every original whose shadow outlived it
    ///
    /// Shadows are left in place. No verification happens here: shadows only
    /// survive the decompress pass if they round-trip exactly.
    pub fn recompress_all(&self) -> Result<PassReport> {
        self.recompress_all_with_progress(&SilentProgress::new())
    }

    /// Recompress pass reporting one step per shadow
    pub fn recompress_all_with_progress(&self, progress: &dyn ProgressTracker) -> Result<PassReport> {
        let mut report = PassReport::default();
        let candidates: Vec<_> = self
            .snapshot(&mut report)?
            .into_iter()
            .filter(|path| self.is_shadow(path))
            .collect();
        report.candidates = candidates.len();
        progress.set_length(candidates.len() as u64);

        for shadow in candidates {
            progress.set_message(&self.display_name(&shadow));
            match self.recompress_file(&shadow) {
                Ok(outcome) => report.record_recompress(outcome),
                Err(err) => self.record_error(&mut report, err)?,
            }
            progress.increment(1);
        }

        info!("Recompress pass over {}: {}", self.root.display(), report);
        Ok(report)
    }

    /// Rebuild the original of a single shadow if it is missing
    ///
    /// Never overwrites an existing original, even one that appears between
    /// the existence check and the final rename.
    pub fn recompress_file(&self, shadow: &Path) -> std::result::Result<RecompressOutcome, FileError> {
        let Some(original) = self.original_path(shadow) else {
            return Ok(RecompressOutcome::NotShadow);
        };
        if occupied(&original).map_err(|e| FileError::io(&original, FileOp::Stat, e))? {
            debug!("Original present: {}", original.display());
            return Ok(RecompressOutcome::OriginalPresent);
        }

        let source = File::open(shadow).map_err(|e| FileError::io(shadow, FileOp::Open, e))?;
        let permissions = source
            .metadata()
            .map_err(|e| FileError::io(shadow, FileOp::Stat, e))?
            .permissions();

        let dir = original.parent().unwrap_or(&self.root);
        let mut staged = self
            .staging_file(dir)
            .map_err(|e| FileError::io(&original, FileOp::Create, e))?;

        let plaintext_len = compress_stream(source, &mut staged, &self.params)
            .map_err(|e| FileError::io(shadow, FileOp::Compress, e))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| FileError::io(&original, FileOp::Write, e))?;

        fs::set_permissions(staged.path(), permissions)
            .map_err(|e| FileError::io(&original, FileOp::Write, e))?;
        staged
            .persist_noclobber(&original)
            .map_err(|e| FileError::io(&original, FileOp::Persist, e.error))?;

        info!(
            "Regenerated {} from shadow ({} plaintext bytes)",
            original.display(),
            plaintext_len
        );
        Ok(RecompressOutcome::Regenerated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::{GzipParams, compress};
    use tempfile::TempDir;

    #[test]
    fn test_recompress_file_regenerates_original() {
        let temp = TempDir::new().unwrap();
        let tree = ShadowTree::new(temp.path()).unwrap();
        let original = temp.path().join("layer");
        let shadow = tree.shadow_path(&original);
        std::fs::write(&shadow, b"plaintext layer").unwrap();

        assert_eq!(tree.recompress_file(&shadow).unwrap(), RecompressOutcome::Regenerated);
        assert_eq!(
            std::fs::read(&original).unwrap(),
            compress(b"plaintext layer", &GzipParams::default()).unwrap()
        );
        // Shadow stays
        assert!(shadow.exists());
    }

    #[test]
    fn test_recompress_file_keeps_existing_original() {
        let temp = TempDir::new().unwrap();
        let tree = ShadowTree::new(temp.path()).unwrap();
        let original = temp.path().join("layer");
        let shadow = tree.shadow_path(&original);
        std::fs::write(&original, b"independently restored").unwrap();
        std::fs::write(&shadow, b"plaintext").unwrap();

        assert_eq!(
            tree.recompress_file(&shadow).unwrap(),
            RecompressOutcome::OriginalPresent
        );
        assert_eq!(std::fs::read(&original).unwrap(), b"independently restored");
    }

    #[test]
    fn test_recompress_file_ignores_non_shadow() {
        let temp = TempDir::new().unwrap();
        let tree = ShadowTree::new(temp.path()).unwrap();
        let plain = temp.path().join("plain");
        std::fs::write(&plain, b"x").unwrap();

        assert_eq!(tree.recompress_file(&plain).unwrap(), RecompressOutcome::NotShadow);
    }

    #[test]
    fn test_recompress_file_missing_shadow() {
        let temp = TempDir::new().unwrap();
        let tree = ShadowTree::new(temp.path()).unwrap();
        let shadow = tree.shadow_path(&temp.path().join("gone"));

        let err = tree.recompress_file(&shadow).unwrap_err();
        assert_eq!(err.op, FileOp::Open);
        assert!(!temp.path().join("gone").exists());
    }
}

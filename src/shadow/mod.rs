// src/shadow/mod.rs

//! Decompressed shadow copies of gzip files in a directory tree
//!
//! A shadow is the plaintext of an original gzip file, stored next to it
//! under the original's path plus a fixed marker suffix:
//!
//! ```text
//! blobs/sha256/ab/data                         original (gzip)
//! blobs/sha256/ab/data_UNGZIPPED_BY_BOOSTER    shadow (plaintext)
//! ```
//!
//! Three operations work on a tree:
//! - **decompress pass**: create a shadow for every gzip file that
//!   round-trips byte-for-byte, discarding shadows that do not
//! - **recompress pass**: rebuild missing originals from their shadows
//! - **logical view**: list the tree with each original masked by its shadow
//!
//! Which files were handled is never cached: every pass derives it from the
//! file names on disk at the moment it runs, so passes can be interrupted and
//! re-run at any time.

mod decompress;
mod recompress;
mod report;
mod view;

pub use decompress::DecompressOutcome;
pub use recompress::RecompressOutcome;
pub use report::{FileError, FileOp, PassReport};

use crate::compression::GzipParams;
use crate::config::BoosterConfig;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;
use walkdir::WalkDir;

/// Suffix appended to an original's path to name its shadow
pub const DEFAULT_MARKER: &str = "_UNGZIPPED_BY_BOOSTER";

/// Extension appended after the marker on temporary files passes write
/// before renaming into place
const STAGING_EXT: &str = ".tmp";

/// `name` with `suffix` removed, compared byte-wise where the platform allows
#[cfg(unix)]
fn strip_name_suffix<'a>(name: &'a OsStr, suffix: &str) -> Option<&'a OsStr> {
    use std::os::unix::ffi::OsStrExt;

    name.as_bytes()
        .strip_suffix(suffix.as_bytes())
        .map(OsStr::from_bytes)
}

#[cfg(not(unix))]
fn strip_name_suffix<'a>(name: &'a OsStr, suffix: &str) -> Option<&'a OsStr> {
    name.to_str()?.strip_suffix(suffix).map(OsStr::new)
}

/// Path of the shadow belonging to `original`
pub fn shadow_path(original: &Path, marker: &str) -> PathBuf {
    let mut name = original.as_os_str().to_owned();
    name.push(marker);
    PathBuf::from(name)
}

/// Path of the original a shadow was derived from, or `None` if `shadow`
/// does not carry the marker
pub fn original_path(shadow: &Path, marker: &str) -> Option<PathBuf> {
    let stem = strip_name_suffix(shadow.file_name()?, marker)?;
    if stem.is_empty() {
        return None;
    }
    Some(shadow.with_file_name(stem))
}

/// True if the file name carries the shadow marker
pub fn is_shadow(path: &Path, marker: &str) -> bool {
    original_path(path, marker).is_some()
}

/// Whether anything (file, directory, dangling symlink) occupies `path`
fn occupied(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// A directory tree managed by booster
#[derive(Debug, Clone)]
pub struct ShadowTree {
    root: PathBuf,
    marker: String,
    params: GzipParams,
    fail_fast: bool,
}

impl ShadowTree {
    /// Open a tree with the default configuration
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::with_config(root, &BoosterConfig::default())
    }

    /// Open a tree with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(root: P, config: &BoosterConfig) -> Result<Self> {
        config.validate()?;
        let root = root.as_ref().to_path_buf();
        if !fs::metadata(&root)?.is_dir() {
            return Err(Error::InvalidRoot(root));
        }

        Ok(Self {
            root,
            marker: config.shadow.marker.clone(),
            params: config.codec,
            fail_fast: config.shadow.fail_fast,
        })
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    #[inline]
    pub fn params(&self) -> &GzipParams {
        &self.params
    }

    /// Shadow path for an original under this tree
    pub fn shadow_path(&self, original: &Path) -> PathBuf {
        shadow_path(original, &self.marker)
    }

    /// Original path for a shadow under this tree
    pub fn original_path(&self, shadow: &Path) -> Option<PathBuf> {
        original_path(shadow, &self.marker)
    }

    pub fn is_shadow(&self, path: &Path) -> bool {
        is_shadow(path, &self.marker)
    }

    /// Path relative to the root, for progress messages
    fn display_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    fn staging_suffix(&self) -> String {
        format!("{}{}", self.marker, STAGING_EXT)
    }

    /// Leftover temporary file from an interrupted pass
    fn is_staging(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| strip_name_suffix(name, &self.staging_suffix()))
            .is_some()
    }

    /// Hidden temporary file in `dir`, named `.<random><marker>.tmp`
    fn staging_file(&self, dir: &Path) -> io::Result<NamedTempFile> {
        let suffix = self.staging_suffix();
        tempfile::Builder::new()
            .prefix(".")
            .suffix(&suffix)
            .tempfile_in(dir)
    }

    /// Regular files present under the root right now
    ///
    /// Passes work from this snapshot so files they create are never
    /// revisited within the same pass.
    fn snapshot(&self, report: &mut PassReport) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && !self.is_staging(entry.path()) => {
                    files.push(entry.into_path())
                }
                Ok(_) => {}
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    self.record_error(report, FileError::io(path, FileOp::Walk, err.into()))?;
                }
            }
        }
        Ok(files)
    }

    /// Collect a per-file error, or abort the pass in fail-fast mode
    fn record_error(&self, report: &mut PassReport, err: FileError) -> Result<()> {
        if self.fail_fast {
            return Err(err.into());
        }
        warn!("{}", err);
        report.errors.push(err);
        Ok(())
    }
}

/// Run the decompress pass over `root` with the default configuration
pub fn decompress_all_in<P: AsRef<Path>>(root: P) -> Result<PassReport> {
    ShadowTree::new(root)?.decompress_all()
}

/// Run the recompress pass over `root` with the default configuration
pub fn recompress_all_in<P: AsRef<Path>>(root: P) -> Result<PassReport> {
    ShadowTree::new(root)?.recompress_all()
}

/// Logical view of `root` with the default configuration
pub fn logical_view_of<P: AsRef<Path>>(root: P) -> Result<BTreeSet<PathBuf>> {
    ShadowTree::new(root)?.logical_view()
}

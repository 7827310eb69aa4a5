// src/shadow/view.rs

//! Logical view: the tree as a consumer should see it

use super::ShadowTree;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use walkdir::WalkDir;

impl ShadowTree {
    /// Relative paths of every non-directory entry under the root, with each
    /// original that has a shadow replaced by that shadow
    ///
    /// Read-only. Entries that vanish or cannot be read during the walk are
    /// left out, so a view taken while a pass runs may be stale but never
    /// fails half-way.
    pub fn logical_view(&self) -> Result<BTreeSet<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::InvalidRoot(self.root.clone()));
        }

        let mut current = BTreeSet::new();
        let mut masked = Vec::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_dir() || self.is_staging(entry.path()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if let Some(original) = self.original_path(relative) {
                masked.push(original);
            }
            current.insert(relative.to_path_buf());
        }

        // Remove originals for which we have a shadow
        for original in masked {
            current.remove(&original);
        }

        Ok(current)
    }
}

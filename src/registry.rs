//! Numbered catalogue of search images found under a directory.
//!
//! The catalogue is built once and then only read, so a surrounding
//! application can offer "pick search image N" without the engine knowing
//! about files at all.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Search images indexed in sorted path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchImageRegistry {
    root: PathBuf,
    entries: Vec<PathBuf>,
}

impl SearchImageRegistry {
    /// Recursively collect every `.png` file under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a directory cannot be read.
    pub fn from_dir(root: &Path) -> Result<Self> {
        let mut entries = Vec::new();
        collect_pngs(root, &mut entries)?;
        entries.sort();
        Ok(Self {
            root: root.to_path_buf(),
            entries,
        })
    }

    /// Directory the registry was built from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of search images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no search images were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of search image `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SearchImageIndex`] for an unknown index.
    pub fn path(&self, index: usize) -> Result<&Path> {
        self.entries
            .get(index)
            .map(PathBuf::as_path)
            .ok_or(Error::SearchImageIndex {
                index,
                available: self.entries.len(),
            })
    }

    /// `(index, display name)` pairs; the name is the path relative to the root.
    pub fn names(&self) -> impl Iterator<Item = (usize, String)> + '_ {
        self.entries.iter().enumerate().map(|(i, p)| {
            let rel = p.strip_prefix(&self.root).unwrap_or(p);
            (i, rel.display().to_string())
        })
    }
}

fn collect_pngs(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_pngs(&path, out)?;
        } else if file_type.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"))
        {
            out.push(path);
        }
    }
    Ok(())
}

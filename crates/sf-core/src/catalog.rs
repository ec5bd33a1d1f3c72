//! SQL script discovery.
//!
//! A [`Catalog`] lists the `*.sql` files directly inside a directory and
//! returns them sorted by byte-wise filename comparison. Filesystem access
//! goes through the narrow [`FileSource`] trait so the engine can run
//! against [`MemoryFileSource`] in tests.

use crate::config::DirectorySetting;
use crate::error::{CoreError, CoreResult};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Extension recognised as a script
pub const SCRIPT_EXTENSION: &str = "sql";

/// Minimal filesystem interface used by the catalog
pub trait FileSource: Send + Sync {
    /// Names of the regular files directly inside `dir`, in any order.
    ///
    /// Returns `Ok(None)` when `dir` does not exist.
    fn list_files(&self, dir: &Path) -> CoreResult<Option<Vec<String>>>;

    /// Raw bytes of the file at `path`
    fn read_bytes(&self, path: &Path) -> CoreResult<Vec<u8>>;
}

/// [`FileSource`] backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSource;

impl FileSource for LocalFileSource {
    fn list_files(&self, dir: &Path) -> CoreResult<Option<Vec<String>>> {
        if !dir.exists() {
            return Ok(None);
        }
        if !dir.is_dir() {
            return Err(CoreError::NotADirectory {
                path: dir.display().to_string(),
            });
        }

        let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    log::warn!(
                        "Skipping file with non UTF-8 name in {}: {:?}",
                        dir.display(),
                        raw
                    );
                }
            }
        }
        Ok(Some(names))
    }

    fn read_bytes(&self, path: &Path) -> CoreResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// In-memory [`FileSource`] for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSource {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryFileSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an (initially empty) directory
    pub fn add_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.insert(dir.into());
    }

    /// Create or overwrite a file, registering its parent directory
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.dirs.insert(parent.to_path_buf());
        }
        self.files.insert(path, content.into());
    }

    /// Delete a file; returns whether it existed
    pub fn remove(&mut self, path: &Path) -> bool {
        self.files.remove(path).is_some()
    }
}

impl FileSource for MemoryFileSource {
    fn list_files(&self, dir: &Path) -> CoreResult<Option<Vec<String>>> {
        if !self.dirs.contains(dir) {
            return Ok(None);
        }
        let names = self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()))
            .map(String::from)
            .collect();
        Ok(Some(names))
    }

    fn read_bytes(&self, path: &Path) -> CoreResult<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| CoreError::IoWithPath {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            })
    }
}

/// A discovered script file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    /// Filename, the unique sort key
    pub name: String,

    /// Full path to the file
    pub path: PathBuf,
}

/// Ordered script discovery over a [`FileSource`]
#[derive(Clone, Copy)]
pub struct Catalog<'a> {
    source: &'a dyn FileSource,
}

impl<'a> Catalog<'a> {
    /// Create a catalog reading through `source`
    pub fn new(source: &'a dyn FileSource) -> Self {
        Self { source }
    }

    /// List the scripts in `dir`, sorted by filename.
    ///
    /// A missing directory yields an empty list. Calling this again
    /// re-reads the directory.
    pub fn discover(&self, dir: &DirectorySetting) -> CoreResult<Vec<ScriptEntry>> {
        let names = self.source.list_files(dir.path())?.unwrap_or_default();
        Ok(Self::collect_scripts(dir.path(), names))
    }

    /// Like [`Catalog::discover`], but a missing directory is an error when
    /// the user configured it explicitly.
    pub fn discover_required(&self, dir: &DirectorySetting) -> CoreResult<Vec<ScriptEntry>> {
        match self.source.list_files(dir.path())? {
            Some(names) => Ok(Self::collect_scripts(dir.path(), names)),
            None if dir.explicit => Err(CoreError::DirectoryNotFound {
                path: dir.path().display().to_string(),
            }),
            None => {
                log::debug!("Default directory {} does not exist", dir);
                Ok(Vec::new())
            }
        }
    }

    /// Read the raw bytes of a discovered script
    pub fn read(&self, entry: &ScriptEntry) -> CoreResult<Vec<u8>> {
        self.source.read_bytes(&entry.path)
    }

    fn collect_scripts(dir: &Path, names: Vec<String>) -> Vec<ScriptEntry> {
        let mut scripts: Vec<ScriptEntry> = names
            .into_iter()
            .filter(|name| is_script(name))
            .map(|name| ScriptEntry {
                path: dir.join(&name),
                name,
            })
            .collect();

        // String ordering is byte-wise, never locale-aware
        scripts.sort_by(|a, b| a.name.cmp(&b.name));
        scripts
    }
}

fn is_script(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == SCRIPT_EXTENSION)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;

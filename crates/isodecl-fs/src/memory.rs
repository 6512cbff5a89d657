//! In-memory filesystem implementation.

use crate::{normalize_lexically, FileSystem};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Filesystem backed by a shared in-memory map.
///
/// Directories are implicit: `create_dir_all` always succeeds and `exists`
/// only reports files. Clones share the same storage, so a test can hand one
/// clone to a build and inspect the written files through another.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    project_root: PathBuf,
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
}

impl MemoryFileSystem {
    /// Create an in-memory filesystem from pre-loaded files.
    ///
    /// Relative keys are taken relative to `project_root`.
    ///
    /// # Errors
    ///
    /// Returns `io::ErrorKind::InvalidInput` if a file lies outside the root.
    pub fn new(
        project_root: impl AsRef<Path>,
        files: impl IntoIterator<Item = (PathBuf, String)>,
    ) -> io::Result<Self> {
        let fs = Self {
            project_root: normalize_lexically(project_root.as_ref()),
            files: Arc::new(RwLock::new(HashMap::new())),
        };
        for (path, contents) in files {
            let normalized = fs.validate_path(&path).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("File path outside project root: {}", path.display()),
                )
            })?;
            fs.files.write().insert(normalized, contents);
        }
        Ok(fs)
    }

    /// Create an empty filesystem.
    pub fn empty(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: normalize_lexically(project_root.as_ref()),
            files: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add or replace a file.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<String>) -> io::Result<()> {
        let normalized = self.validate_path(path.as_ref())?;
        self.files.write().insert(normalized, contents.into());
        Ok(())
    }

    /// Snapshot of every stored file, sorted by path.
    pub fn files(&self) -> Vec<(PathBuf, String)> {
        let mut files: Vec<_> = self
            .files
            .read()
            .iter()
            .map(|(path, contents)| (path.clone(), contents.clone()))
            .collect();
        files.sort();
        files
    }

    fn validate_path(&self, path: &Path) -> io::Result<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        };
        let normalized = normalize_lexically(&absolute);

        if !normalized.starts_with(&self.project_root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!(
                    "Path traversal detected: {} is outside {}",
                    normalized.display(),
                    self.project_root.display()
                ),
            ));
        }

        Ok(normalized)
    }
}

#[async_trait::async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let normalized = self.validate_path(path)?;
        Ok(self.files.read().contains_key(&normalized))
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let normalized = self.validate_path(path)?;
        self.files.read().get(&normalized).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", normalized.display()),
            )
        })
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let normalized = self.validate_path(path)?;
        self.files.write().insert(normalized, contents.to_string());
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.validate_path(path).map(|_| ())
    }

    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

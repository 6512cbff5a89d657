//! Native filesystem implementation using std::fs + tokio.

use crate::{normalize_lexically, FileSystem};
use std::io;
use std::path::{Path, PathBuf};
use tokio::task;

/// Native filesystem scoped to a project root.
///
/// Blocking `std::fs` calls run on tokio's blocking pool so a build session
/// awaiting several reads does not stall the runtime.
#[derive(Debug, Clone)]
pub struct NativeFileSystem {
    project_root: PathBuf,
    canonical_root: PathBuf,
}

impl NativeFileSystem {
    /// Create a native filesystem scoped to `project_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the root nor its parent can be
    /// canonicalized.
    pub fn new(project_root: impl AsRef<Path>) -> io::Result<Self> {
        let root = project_root.as_ref();
        let project_root = root.canonicalize().or_else(|_| {
            // The output root may not exist yet; anchor it on its parent.
            let parent = root.parent().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Project root does not exist: {}", root.display()),
                )
            })?;
            let name = root.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "Invalid project root path")
            })?;
            Ok::<_, io::Error>(parent.canonicalize()?.join(name))
        })?;

        let canonical_root = project_root
            .canonicalize()
            .unwrap_or_else(|_| project_root.clone());

        Ok(Self {
            project_root,
            canonical_root,
        })
    }

    /// Resolve `path` against the root and reject anything that escapes it.
    fn validate_path(&self, path: &Path) -> io::Result<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        };

        let checked = canonicalize_existing_prefix(&normalize_lexically(&absolute));

        if !checked.starts_with(&self.canonical_root) && !checked.starts_with(&self.project_root)
        {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!(
                    "Path traversal detected: {} is outside project root {}",
                    checked.display(),
                    self.project_root.display()
                ),
            ));
        }

        Ok(checked)
    }
}

/// Canonicalize the longest existing ancestor of `path` and re-append the
/// rest, so paths about to be created still get symlink-resolved roots.
fn canonicalize_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return rest
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl FileSystem for NativeFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || Ok(validated.exists()))
            .await
            .map_err(io::Error::other)?
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || std::fs::read_to_string(&validated))
            .await
            .map_err(io::Error::other)?
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let validated = self.validate_path(path)?;
        let contents = contents.to_string();
        task::spawn_blocking(move || std::fs::write(&validated, contents))
            .await
            .map_err(io::Error::other)?
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || std::fs::create_dir_all(&validated))
            .await
            .map_err(io::Error::other)?
    }

    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

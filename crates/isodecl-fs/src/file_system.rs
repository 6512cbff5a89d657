//! FileSystem trait for source reads and declaration writes.

use std::io;
use std::path::Path;

/// Async filesystem operations needed by a declaration build.
///
/// # Error Handling
///
/// Uses `std::io::Result<T>` throughout:
/// - Native: direct mapping from `std::fs` errors
/// - Memory: `io::Error` constructed with the matching `ErrorKind`
///
/// Paths outside the project root are rejected with
/// `io::ErrorKind::PermissionDenied`.
#[async_trait::async_trait]
pub trait FileSystem: Send + Sync {
    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Read file contents as a string.
    ///
    /// # Errors
    ///
    /// Returns `io::ErrorKind::NotFound` if the file doesn't exist.
    /// Returns `io::ErrorKind::InvalidData` if the file is not valid UTF-8.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string contents to a file, replacing any existing contents.
    ///
    /// Parent directories are NOT created; call [`FileSystem::create_dir_all`]
    /// first.
    async fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Create a directory and all of its parents.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// The root every operation is validated against.
    fn project_root(&self) -> &Path;
}

//! Filesystem abstraction for isodecl.
//!
//! The build session reads the sources of type-only dependencies through a
//! [`FileSystem`], and the CLI writes emitted declarations through one. Two
//! implementations are provided:
//!
//! - [`NativeFileSystem`]: `std::fs` behind `tokio::task::spawn_blocking`,
//!   scoped to a project root
//! - [`MemoryFileSystem`]: an in-memory map, used by tests and by hosts that
//!   keep sources in memory
//!
//! # Example
//!
//! ```no_run
//! use isodecl_fs::{FileSystem, NativeFileSystem};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> std::io::Result<()> {
//! let fs = NativeFileSystem::new(".")?;
//! let source = fs.read_to_string(Path::new("src/index.ts")).await?;
//! println!("{}", source.len());
//! # Ok(())
//! # }
//! ```

mod file_system;
pub use file_system::FileSystem;

#[cfg(feature = "native")]
pub mod native;
#[cfg(feature = "native")]
pub use native::NativeFileSystem;

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "memory")]
pub use memory::MemoryFileSystem;

/// Syntactic normalization shared by both backends.
///
/// Resolves `.` and `..` without touching the disk. `..` above the root is
/// dropped for absolute paths.
pub(crate) fn normalize_lexically(path: &std::path::Path) -> std::path::PathBuf {
    use std::path::{Component, PathBuf};

    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::RootDir => result.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => result.push(".."),
            },
            Component::Normal(name) => result.push(name),
        }
    }
    result
}

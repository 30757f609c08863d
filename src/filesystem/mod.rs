//! Filesystem collaborators
//!
//! Read-side (`FileReader` / `FileHandle`) and driver-side (`FileDriver`)
//! abstractions the resolver is built on, with a real implementation over
//! `tokio::fs` and an in-memory mock for tests.

pub mod local;
pub mod mock;

pub use local::LocalFilesystem;
pub use mock::{MockFile, MockFilesystem};

use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Point-in-time metadata of a file. Every field may be missing depending on
/// what the backing filesystem reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub size: Option<u64>,
    /// Seconds since the unix epoch.
    pub mtime: Option<i64>,
    /// Seconds since the unix epoch.
    pub ctime: Option<i64>,
}

/// An open, readable file.
#[async_trait]
pub trait FileHandle: Send + Sync {
    async fn stat(&self) -> Result<FileStat>;
    async fn read_all(&mut self) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait FileReader: Send + Sync {
    /// Open `path` for reading. Fails for missing paths and for anything
    /// that is not a regular file.
    async fn open(&self, path: &Path) -> Result<Box<dyn FileHandle>>;
}

#[async_trait]
pub trait FileDriver: Send + Sync {
    async fn is_writable(&self, path: &Path) -> Result<bool>;
    fn parent_directory(&self, path: &Path) -> PathBuf;
    async fn stat(&self, path: &Path) -> Result<FileStat>;
}

/// Directory part of `path`, `.` for bare file names.
pub fn dirname(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None if path.as_os_str().is_empty() => PathBuf::from("."),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirname_nested_path() {
        assert_eq!(
            dirname(Path::new("/a/b/new.png")),
            PathBuf::from("/a/b")
        );
    }

    #[test]
    fn test_dirname_bare_file_name() {
        assert_eq!(dirname(Path::new("new.png")), PathBuf::from("."));
        assert_eq!(dirname(Path::new("")), PathBuf::from("."));
    }

    #[test]
    fn test_dirname_root() {
        assert_eq!(dirname(Path::new("/")), PathBuf::from("/"));
        assert_eq!(dirname(Path::new("/new.png")), PathBuf::from("/"));
    }
}

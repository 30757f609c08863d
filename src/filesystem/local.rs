use super::{dirname, FileDriver, FileHandle, FileReader, FileStat};
use crate::{Error, Result};
use async_trait::async_trait;
#[cfg(not(unix))]
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Real filesystem backed by `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

pub struct LocalFileHandle {
    path: PathBuf,
    file: tokio::fs::File,
}

#[cfg(unix)]
fn stat_from_metadata(metadata: &std::fs::Metadata) -> FileStat {
    use std::os::unix::fs::MetadataExt;
    FileStat {
        size: Some(metadata.len()),
        mtime: Some(metadata.mtime()),
        ctime: Some(metadata.ctime()),
    }
}

#[cfg(not(unix))]
fn stat_from_metadata(metadata: &std::fs::Metadata) -> FileStat {
    FileStat {
        size: Some(metadata.len()),
        mtime: metadata.modified().ok().and_then(unix_seconds),
        ctime: metadata.created().ok().and_then(unix_seconds),
    }
}

/// Signed seconds relative to the unix epoch; earlier times are negative.
#[cfg(not(unix))]
fn unix_seconds(time: std::time::SystemTime) -> Option<i64> {
    use std::time::UNIX_EPOCH;
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_secs()).ok(),
        Err(before) => i64::try_from(before.duration().as_secs()).ok().map(|s| -s),
    }
}

/// Ask the kernel whether the calling user may write `path`.
#[cfg(unix)]
async fn check_write_access(path: &Path) -> std::io::Result<bool> {
    use rustix::fs::{access, Access};
    use rustix::io::Errno;

    const DENIED: [Errno; 5] = [
        Errno::NOENT,
        Errno::NOTDIR,
        Errno::ACCESS,
        Errno::ROFS,
        Errno::PERM,
    ];

    let owned = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || access(owned.as_path(), Access::WRITE_OK))
        .await
        .map_err(std::io::Error::other)?;

    match result {
        Ok(()) => Ok(true),
        Err(errno) if DENIED.contains(&errno) => Ok(false),
        Err(errno) => Err(std::io::Error::from(errno)),
    }
}

#[cfg(not(unix))]
async fn check_write_access(path: &Path) -> std::io::Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(!metadata.permissions().readonly()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl FileHandle for LocalFileHandle {
    async fn stat(&self) -> Result<FileStat> {
        let metadata = self
            .file
            .metadata()
            .await
            .map_err(|e| Error::file_system(&self.path, e))?;
        Ok(stat_from_metadata(&metadata))
    }

    async fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut contents = Vec::new();
        self.file
            .read_to_end(&mut contents)
            .await
            .map_err(|e| Error::file_system(&self.path, e))?;
        Ok(contents)
    }
}

#[async_trait]
impl FileReader for LocalFilesystem {
    async fn open(&self, path: &Path) -> Result<Box<dyn FileHandle>> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::file_system(path, e))?;
        if !metadata.is_file() {
            return Err(Error::file_system(
                path,
                std::io::Error::other("not a regular file"),
            ));
        }

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::file_system(path, e))?;

        Ok(Box::new(LocalFileHandle {
            path: path.to_path_buf(),
            file,
        }))
    }
}

#[async_trait]
impl FileDriver for LocalFilesystem {
    async fn is_writable(&self, path: &Path) -> Result<bool> {
        check_write_access(path)
            .await
            .map_err(|e| Error::file_system(path, e))
    }

    fn parent_directory(&self, path: &Path) -> PathBuf {
        dirname(path)
    }

    async fn stat(&self, path: &Path) -> Result<FileStat> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::file_system(path, e))?;
        Ok(stat_from_metadata(&metadata))
    }
}

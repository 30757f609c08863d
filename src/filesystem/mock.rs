use super::{dirname, FileDriver, FileHandle, FileReader, FileStat};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A file held by [`MockFilesystem`].
#[derive(Debug, Clone)]
pub struct MockFile {
    content: Vec<u8>,
    mtime: Option<i64>,
    ctime: Option<i64>,
    reports_size: bool,
    writable: bool,
}

impl MockFile {
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            mtime: None,
            ctime: None,
            reports_size: true,
            writable: true,
        }
    }

    pub fn with_mtime(mut self, mtime: i64) -> Self {
        self.mtime = Some(mtime);
        self
    }

    pub fn with_ctime(mut self, ctime: i64) -> Self {
        self.ctime = Some(ctime);
        self
    }

    /// Handle stats leave `size` empty, like stream wrappers that cannot
    /// report one.
    pub fn without_size(mut self) -> Self {
        self.reports_size = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    fn stat(&self) -> FileStat {
        FileStat {
            size: self.reports_size.then_some(self.content.len() as u64),
            mtime: self.mtime,
            ctime: self.ctime,
        }
    }
}

struct MockFileHandle {
    file: MockFile,
}

#[async_trait]
impl FileHandle for MockFileHandle {
    async fn stat(&self) -> Result<FileStat> {
        Ok(self.file.stat())
    }

    async fn read_all(&mut self) -> Result<Vec<u8>> {
        Ok(self.file.content.clone())
    }
}

/// In-memory filesystem implementing both [`FileReader`] and [`FileDriver`].
#[derive(Clone)]
pub struct MockFilesystem {
    files: Arc<Mutex<HashMap<PathBuf, MockFile>>>,
    directories: Arc<Mutex<HashMap<PathBuf, bool>>>,
    unreadable: Arc<Mutex<HashSet<PathBuf>>>,
    failing_stats: Arc<Mutex<HashSet<PathBuf>>>,
    failing_writability: Arc<Mutex<HashSet<PathBuf>>>,
    open_count: Arc<Mutex<usize>>,
    stat_count: Arc<Mutex<usize>>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            directories: Arc::new(Mutex::new(HashMap::new())),
            unreadable: Arc::new(Mutex::new(HashSet::new())),
            failing_stats: Arc::new(Mutex::new(HashSet::new())),
            failing_writability: Arc::new(Mutex::new(HashSet::new())),
            open_count: Arc::new(Mutex::new(0)),
            stat_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_file(self, path: impl Into<PathBuf>, file: MockFile) -> Self {
        self.files.lock().unwrap().insert(path.into(), file);
        self
    }

    pub fn with_directory(self, path: impl Into<PathBuf>, writable: bool) -> Self {
        self.directories.lock().unwrap().insert(path.into(), writable);
        self
    }

    /// Opening the path fails with a permission error.
    pub fn with_unreadable(self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.lock().unwrap().insert(path.into());
        self
    }

    /// Driver stats on the path fail.
    pub fn with_failing_stat(self, path: impl Into<PathBuf>) -> Self {
        self.failing_stats.lock().unwrap().insert(path.into());
        self
    }

    /// Writability checks on the path fail with an I/O error.
    pub fn with_failing_writability(self, path: impl Into<PathBuf>) -> Self {
        self.failing_writability.lock().unwrap().insert(path.into());
        self
    }

    pub fn insert_file(&self, path: impl Into<PathBuf>, file: MockFile) {
        self.files.lock().unwrap().insert(path.into(), file);
    }

    pub fn remove_file(&self, path: &Path) -> Option<MockFile> {
        self.files.lock().unwrap().remove(path)
    }

    pub fn get_open_count(&self) -> usize {
        *self.open_count.lock().unwrap()
    }

    pub fn get_stat_count(&self) -> usize {
        *self.stat_count.lock().unwrap()
    }

    fn not_found(path: &Path) -> Error {
        Error::file_system(
            path,
            std::io::Error::new(ErrorKind::NotFound, "No such file or directory"),
        )
    }
}

impl Default for MockFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileReader for MockFilesystem {
    async fn open(&self, path: &Path) -> Result<Box<dyn FileHandle>> {
        *self.open_count.lock().unwrap() += 1;

        if self.unreadable.lock().unwrap().contains(path) {
            return Err(Error::file_system(
                path,
                std::io::Error::new(ErrorKind::PermissionDenied, "Permission denied"),
            ));
        }

        match self.files.lock().unwrap().get(path) {
            Some(file) => Ok(Box::new(MockFileHandle { file: file.clone() })),
            None => Err(Self::not_found(path)),
        }
    }
}

#[async_trait]
impl FileDriver for MockFilesystem {
    async fn is_writable(&self, path: &Path) -> Result<bool> {
        if self.failing_writability.lock().unwrap().contains(path) {
            return Err(Error::file_system(
                path,
                std::io::Error::other("Mock writability failure"),
            ));
        }

        if let Some(file) = self.files.lock().unwrap().get(path) {
            return Ok(file.writable);
        }
        Ok(self
            .directories
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(false))
    }

    fn parent_directory(&self, path: &Path) -> PathBuf {
        dirname(path)
    }

    async fn stat(&self, path: &Path) -> Result<FileStat> {
        *self.stat_count.lock().unwrap() += 1;

        if self.failing_stats.lock().unwrap().contains(path) {
            return Err(Error::file_system(
                path,
                std::io::Error::other("Mock stat failure"),
            ));
        }

        if let Some(file) = self.files.lock().unwrap().get(path) {
            return Ok(file.stat());
        }
        if self.directories.lock().unwrap().contains_key(path) {
            return Ok(FileStat::default());
        }
        Err(Self::not_found(path))
    }
}

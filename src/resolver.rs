//! Artifact resolution and staleness decisions
//!
//! Decides whether a converted image exists, whether it is newer than its
//! source, and maps public URIs back to filesystem paths. Nothing is cached:
//! every call goes back to the filesystem, so concurrent callers may observe
//! different answers for the same path and may both decide to convert.

use crate::convertor::UrlConvertor;
use crate::diagnostics::Diagnostics;
use crate::filesystem::{FileDriver, FileReader};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Collaborators the resolver is constructed from.
pub struct ResolverServices {
    pub reader: Box<dyn FileReader>,
    pub driver: Box<dyn FileDriver>,
    pub convertor: Box<dyn UrlConvertor>,
    pub diagnostics: Box<dyn Diagnostics>,
}

pub struct ArtifactResolver {
    reader: Box<dyn FileReader>,
    driver: Box<dyn FileDriver>,
    convertor: Box<dyn UrlConvertor>,
    diagnostics: Box<dyn Diagnostics>,
    public_dir: PathBuf,
}

impl ArtifactResolver {
    /// `public_dir` is the document root public image paths are resolved
    /// against.
    pub fn with_services(services: ResolverServices, public_dir: PathBuf) -> Self {
        Self {
            reader: services.reader,
            driver: services.driver,
            convertor: services.convertor,
            diagnostics: services.diagnostics,
            public_dir,
        }
    }

    /// Map `uri` to a filesystem path.
    ///
    /// A URI that already names an existing file is returned unchanged;
    /// anything else goes through the URL convertor. Convertor failures are
    /// reported as [`Error::Resolution`].
    pub async fn resolve(&self, uri: &str) -> Result<PathBuf> {
        if self.file_exists(Path::new(uri)).await {
            return Ok(PathBuf::from(uri));
        }

        self.convertor.filename_from_url(uri).await.map_err(|e| {
            debug!("Could not resolve {}: {}", uri, e);
            Error::Resolution(e.to_string())
        })
    }

    pub async fn uri_exists(&self, uri: &str) -> Result<bool> {
        let path = self.resolve(uri).await?;
        Ok(self.file_exists(&path).await)
    }

    /// `true` when `path` can be opened and is not empty. Every failure,
    /// including permission errors, reads as `false`.
    pub async fn file_exists(&self, path: &Path) -> bool {
        match self.probe(path).await {
            Ok(exists) => exists,
            Err(e) => {
                debug!("Treating {} as missing: {}", path.display(), e);
                false
            }
        }
    }

    async fn probe(&self, path: &Path) -> Result<bool> {
        let mut handle = self.reader.open(path).await?;
        let stat = handle.stat().await?;
        if let Some(size) = stat.size {
            return Ok(size > 0);
        }

        // Some backends cannot report a size.
        Ok(!handle.read_all().await?.is_empty())
    }

    /// Whether a file could be written at `path`. For paths that do not exist
    /// yet the parent directory decides.
    pub async fn is_writable(&self, path: &Path) -> Result<bool> {
        if self.file_exists(path).await {
            return self.driver.is_writable(path).await;
        }

        let parent = self.driver.parent_directory(path);
        self.driver.is_writable(&parent).await
    }

    /// Location of a public image path (`/media/...`) below the public
    /// directory. The image path is appended as is.
    pub fn absolute_path_from_image_path(&self, image_path: &str) -> PathBuf {
        let mut path = self.public_dir.as_os_str().to_os_string();
        path.push(image_path);
        PathBuf::from(path)
    }

    /// Modification time in unix seconds, falling back to the change time.
    /// `None` means unknown, either because the stat failed or because
    /// neither timestamp is set.
    pub async fn modification_time(&self, path: &Path) -> Option<i64> {
        match self.driver.stat(path).await {
            Ok(stat) => stat
                .mtime
                .filter(|time| *time != 0)
                .or(stat.ctime.filter(|time| *time != 0)),
            Err(e) => {
                self.diagnostics
                    .record(&e.to_string(), &[("file_path", path.display().to_string())]);
                None
            }
        }
    }

    /// Whether `target` exists and was modified strictly after `comparison`.
    ///
    /// An unknown target time is never newer; an unknown comparison time
    /// always loses to a known target time.
    pub async fn is_newer_than(&self, target: &Path, comparison: &Path) -> bool {
        if !self.file_exists(target).await {
            return false;
        }

        let Some(target_time) = self.modification_time(target).await else {
            return false;
        };

        let Some(comparison_time) = self.modification_time(comparison).await else {
            return true;
        };

        target_time > comparison_time
    }

    /// Whether `destination` has to be generated from `source`.
    ///
    /// An existing destination is never reconverted, even when it is older
    /// than the source. The staleness check only runs once the destination is
    /// known to be missing.
    pub async fn needs_conversion(&self, source: &Path, destination: &Path) -> bool {
        if !self.file_exists(source).await {
            return false;
        }

        if self.file_exists(destination).await {
            return false;
        }

        if self.is_newer_than(destination, source).await {
            return false;
        }

        true
    }
}

use super::{ConvertorError, UrlConvertor};
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

/// Resolves URLs below `base_url` to files below `public_dir`.
///
/// Both absolute URLs (`https://shop.test/media/a.png`) and URL paths
/// (`/media/a.png`) are accepted; paths are interpreted relative to the base
/// URL's origin.
pub struct BaseUrlConvertor {
    base_url: Url,
    public_dir: PathBuf,
}

impl BaseUrlConvertor {
    pub fn new(base_url: &str, public_dir: &Path) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            public_dir: public_dir.to_path_buf(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Map a URL onto a candidate path without touching the filesystem.
    pub fn candidate_path(&self, uri: &str) -> std::result::Result<PathBuf, ConvertorError> {
        let url = self.base_url.join(uri)?;
        if url.origin() != self.base_url.origin() {
            return Err(ConvertorError::OutsideBaseUrl(uri.to_string()));
        }

        let relative = url
            .path()
            .strip_prefix(self.base_url.path())
            .ok_or_else(|| ConvertorError::OutsideBaseUrl(uri.to_string()))?;

        let mut path = self.public_dir.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            let decoded = urlencoding::decode(segment)
                .map_err(|_| ConvertorError::InvalidEncoding(uri.to_string()))?;
            if decoded == "." || decoded == ".." || decoded.contains(['/', '\\']) {
                return Err(ConvertorError::InvalidEncoding(uri.to_string()));
            }
            path.push(&*decoded);
        }

        if path == self.public_dir {
            return Err(ConvertorError::NotFound(uri.to_string()));
        }
        Ok(path)
    }
}

#[async_trait]
impl UrlConvertor for BaseUrlConvertor {
    async fn filename_from_url(&self, uri: &str) -> std::result::Result<PathBuf, ConvertorError> {
        let path = self.candidate_path(uri)?;

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(path),
            _ => {
                tracing::debug!("No file at {} for URL {}", path.display(), uri);
                Err(ConvertorError::NotFound(uri.to_string()))
            }
        }
    }
}

//! URL-to-path conversion
//!
//! Maps public asset URLs back onto files below the public document root.
//! Failures carry their own error type; the resolver translates them before
//! they reach callers.

pub mod base_url;
pub mod mock;

pub use base_url::BaseUrlConvertor;
pub use mock::MockUrlConvertor;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertorError {
    #[error("No file found for URL {0}")]
    NotFound(String),

    #[error("URL {0} is outside the configured base URL")]
    OutsideBaseUrl(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid path encoding in URL {0}")]
    InvalidEncoding(String),
}

#[async_trait]
pub trait UrlConvertor: Send + Sync {
    async fn filename_from_url(&self, uri: &str) -> std::result::Result<PathBuf, ConvertorError>;
}

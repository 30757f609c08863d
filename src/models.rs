//! Data models and configuration
//!
//! Defines the per-URI conversion report produced by [`crate::app::App`] and
//! the environment-driven configuration.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionCheck {
    pub uri: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub destination_exists: bool,
    pub source_modified: Option<DateTime<Utc>>,
    pub destination_modified: Option<DateTime<Utc>>,
    pub writable: bool,
    /// The destination exists but is not newer than its source. Such files
    /// are kept; see [`crate::resolver::ArtifactResolver::needs_conversion`].
    pub stale: bool,
    pub needs_conversion: bool,
}

impl ConversionCheck {
    pub fn verdict(&self) -> &'static str {
        match (self.needs_conversion, self.writable, self.stale) {
            (true, true, _) => "convert",
            (true, false, _) => "convert (destination not writable)",
            (false, _, true) => "stale, kept",
            (false, _, false) => "up to date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionStatus {
    Checked(ConversionCheck),
    Skipped {
        uri: String,
        source: PathBuf,
        reason: String,
    },
    Unresolved {
        uri: String,
        reason: String,
    },
    Failed {
        uri: String,
        reason: String,
    },
}

impl ConversionStatus {
    pub fn uri(&self) -> &str {
        match self {
            ConversionStatus::Checked(check) => &check.uri,
            ConversionStatus::Skipped { uri, .. }
            | ConversionStatus::Unresolved { uri, .. }
            | ConversionStatus::Failed { uri, .. } => uri,
        }
    }

    pub fn needs_conversion(&self) -> bool {
        matches!(self, ConversionStatus::Checked(check) if check.needs_conversion)
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStatus::Checked(check) => write!(
                f,
                "{} -> {}: {}",
                check.uri,
                check.destination.display(),
                check.verdict()
            ),
            ConversionStatus::Skipped { uri, reason, .. } => {
                write!(f, "{}: skipped ({})", uri, reason)
            }
            ConversionStatus::Unresolved { uri, reason } => {
                write!(f, "{}: unresolved ({})", uri, reason)
            }
            ConversionStatus::Failed { uri, reason } => write!(f, "{}: failed ({})", uri, reason),
        }
    }
}

/// Convert unix seconds into a timestamp for reports.
pub fn timestamp(seconds: Option<i64>) -> Option<DateTime<Utc>> {
    seconds.and_then(|secs| DateTime::from_timestamp(secs, 0))
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub root_dir: PathBuf,
    pub public_dir: PathBuf,
    pub base_url: String,
    pub destination_suffix: String,
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root_dir = lookup("NEXTGEN_ROOT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let public_dir = lookup("NEXTGEN_PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| root_dir.join("pub"));

        let base_url =
            lookup("NEXTGEN_BASE_URL").unwrap_or_else(|| "http://localhost/".to_string());
        url::Url::parse(&base_url)?;

        let destination_suffix =
            lookup("NEXTGEN_DESTINATION_SUFFIX").unwrap_or_else(|| ".webp".to_string());
        validate_suffix(&destination_suffix)?;

        let debug = match lookup("NEXTGEN_DEBUG") {
            Some(value) => parse_flag(&value).ok_or_else(|| {
                Error::Config(format!("NEXTGEN_DEBUG must be a boolean, got '{}'", value))
            })?,
            None => false,
        };

        Ok(Self {
            root_dir,
            public_dir,
            base_url,
            destination_suffix,
            debug,
        })
    }
}

const SOURCE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

pub fn validate_suffix(suffix: &str) -> Result<()> {
    if suffix.len() < 2 || !suffix.starts_with('.') || suffix.contains(['/', '\\']) {
        return Err(Error::Config(format!(
            "Destination suffix must look like '.webp', got '{}'",
            suffix
        )));
    }
    // A source extension would map every image onto itself.
    if SOURCE_EXTENSIONS
        .iter()
        .any(|extension| suffix.eq_ignore_ascii_case(extension))
    {
        return Err(Error::Config(format!(
            "Destination suffix '{}' is a source image extension",
            suffix
        )));
    }
    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Conversion planning for batches of image URIs.

use crate::convertor::BaseUrlConvertor;
use crate::diagnostics::TracingDiagnostics;
use crate::filesystem::LocalFilesystem;
use crate::models::{timestamp, validate_suffix, Config, ConversionCheck, ConversionStatus};
use crate::naming::{convert_suffix, has_convertible_suffix};
use crate::resolver::{ArtifactResolver, ResolverServices};
use crate::{Error, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// Resolves URIs and reports which next-gen artifacts have to be generated.
pub struct App {
    resolver: ArtifactResolver,
    destination_suffix: String,
}

impl App {
    /// Build an app around an existing resolver.
    ///
    /// This is primarily useful for tests that inject mock collaborators.
    pub fn with_resolver(resolver: ArtifactResolver, destination_suffix: String) -> Result<Self> {
        validate_suffix(&destination_suffix)?;
        Ok(Self {
            resolver,
            destination_suffix,
        })
    }

    /// Construct an app on the local filesystem from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let filesystem = LocalFilesystem::new();
        let convertor = BaseUrlConvertor::new(&config.base_url, &config.public_dir)?;
        info!(
            "Resolving URLs below {} to {}",
            convertor.base_url(),
            config.public_dir.display()
        );

        let resolver = ArtifactResolver::with_services(
            ResolverServices {
                reader: Box::new(filesystem.clone()),
                driver: Box::new(filesystem),
                convertor: Box::new(convertor),
                diagnostics: Box::new(TracingDiagnostics::new(config.debug)),
            },
            config.public_dir.clone(),
        );

        Self::with_resolver(resolver, config.destination_suffix.clone())
    }

    pub fn resolver(&self) -> &ArtifactResolver {
        &self.resolver
    }

    /// Check every URI. Failures are reported per URI and never abort the
    /// batch.
    pub async fn run(&self, uris: &[String]) -> Vec<ConversionStatus> {
        let mut statuses = Vec::with_capacity(uris.len());

        for uri in uris {
            let status = match self.check(uri).await {
                Ok(status) => status,
                Err(e) => {
                    warn!("Failed to check {}: {}", uri, e);
                    ConversionStatus::Failed {
                        uri: uri.clone(),
                        reason: e.to_string(),
                    }
                }
            };
            info!("{}", status);
            statuses.push(status);
        }

        let pending = statuses.iter().filter(|s| s.needs_conversion()).count();
        info!("Checked {} URIs, {} need conversion", statuses.len(), pending);
        statuses
    }

    /// Check a single URI.
    ///
    /// Resolution failures become [`ConversionStatus::Unresolved`];
    /// writability I/O errors are returned.
    pub async fn check(&self, uri: &str) -> Result<ConversionStatus> {
        let source = match self.resolver.resolve(uri).await {
            Ok(path) => path,
            Err(Error::Resolution(reason)) => {
                return Ok(ConversionStatus::Unresolved {
                    uri: uri.to_string(),
                    reason,
                })
            }
            Err(e) => return Err(e),
        };

        let Some(source_name) = source.to_str() else {
            return Ok(ConversionStatus::Skipped {
                uri: uri.to_string(),
                source,
                reason: "path is not valid UTF-8".to_string(),
            });
        };
        if !has_convertible_suffix(source_name) {
            return Ok(ConversionStatus::Skipped {
                uri: uri.to_string(),
                reason: "not a JPEG or PNG image".to_string(),
                source,
            });
        }

        let destination = PathBuf::from(convert_suffix(source_name, &self.destination_suffix));
        let destination_exists = self.resolver.file_exists(&destination).await;
        let stale =
            destination_exists && !self.resolver.is_newer_than(&destination, &source).await;
        let writable = self.resolver.is_writable(&destination).await?;
        let needs_conversion = self.resolver.needs_conversion(&source, &destination).await;

        Ok(ConversionStatus::Checked(ConversionCheck {
            uri: uri.to_string(),
            source_modified: timestamp(self.resolver.modification_time(&source).await),
            destination_modified: if destination_exists {
                timestamp(self.resolver.modification_time(&destination).await)
            } else {
                None
            },
            source,
            destination,
            destination_exists,
            writable,
            stale,
            needs_conversion,
        }))
    }
}

//! Staleness detection for next-gen image artifacts
//!
//! Decides whether a converted image (WebP, AVIF, ...) has to be generated for
//! a source JPEG or PNG, and maps public image URLs back onto the files they
//! are served from. Encoding itself is left to the caller.

pub mod app;
pub mod convertor;
pub mod diagnostics;
pub mod error;
pub mod filesystem;
pub mod models;
pub mod naming;
pub mod resolver;

pub use error::{Error, Result};
pub use naming::convert_suffix;
pub use resolver::{ArtifactResolver, ResolverServices};

//! Destination file naming

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

static SOURCE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png)").expect("source extension pattern is valid")
});

/// Replace the first `.jpg`, `.jpeg` or `.png` (any case) in `source_filename`
/// with `destination_suffix`.
///
/// The match is not anchored to the end of the name, so `a.png.bak` becomes
/// `a.webp.bak` and `/media/x.jpg/y.gif` becomes `/media/x.webp/y.gif`.
/// Names without a match are returned unchanged.
pub fn convert_suffix(source_filename: &str, destination_suffix: &str) -> String {
    SOURCE_EXTENSION
        .replace(source_filename, NoExpand(destination_suffix))
        .into_owned()
}

/// Whether `convert_suffix` would change `source_filename`.
pub fn has_convertible_suffix(source_filename: &str) -> bool {
    SOURCE_EXTENSION.is_match(source_filename)
}

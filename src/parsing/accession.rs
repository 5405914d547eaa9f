//! Assembly accession extraction from reference file paths.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::types::UNKNOWN;

/// Pattern of a GenBank assembly accession, e.g. `GCA_000123.1`
pub const ACCESSION_PATTERN: &str = r"GCA_\d+\.\d+";

fn accession_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(ACCESSION_PATTERN).ok())
        .as_ref()
}

/// Find the first assembly accession anywhere in the path.
///
/// Returns `"Unknown"` when the path contains no accession.
#[must_use]
pub fn accession_from_path(path: &Path) -> String {
    let path = path.to_string_lossy();
    accession_regex()
        .and_then(|regex| regex.find(&path))
        .map_or_else(|| UNKNOWN.to_string(), |m| m.as_str().to_string())
}

use serde::{Deserialize, Serialize};

/// Placeholder used when a reference name or accession cannot be determined
pub const UNKNOWN: &str = "Unknown";

/// Identifier of a reference sequence: the first token of its FASTA header
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceId(pub String);

impl ReferenceId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The shared identity given to records whose header could not be parsed
    #[must_use]
    pub fn unknown() -> Self {
        Self(UNKNOWN.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for ReferenceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReferenceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

//! Post-processing of match result tables.
//!
//! - [`taxid`]: append a taxonomy id column from an accession map
//! - [`filter`]: threshold rows and keep the best hit per query sequence
//! - [`table`]: the comma-separated format shared by all result files

pub mod filter;
pub mod table;
pub mod taxid;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::utils::validation::ConfigError;

pub use filter::{filter_best_hits, ReportConfig};
pub use taxid::{append_taxid_column, load_taxid_map};

/// File name of the full match table inside an output directory
pub const MATCH_RESULTS_FILE: &str = "matching_results.csv";
/// File name of the best-hit table inside an output directory
pub const FILTERED_RESULTS_FILE: &str = "filtered_results.csv";

/// Column holding the query sequence name
pub const NAME_COLUMN: &str = "Sequence Name";
/// Column holding the reference accession
pub const ACCESSION_COLUMN: &str = "GCA Name";
/// Column holding the Jaccard score
pub const JACCARD_COLUMN: &str = "Jacc";
/// Column holding the query coverage score
pub const QCOV_COLUMN: &str = "Qcov";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to replace results file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Results file has no header: {}", .0.display())]
    Empty(PathBuf),

    #[error("Results header has no '{0}' column")]
    MissingColumn(String),

    #[error("Invalid {column} value '{value}' on line {line}")]
    InvalidNumber {
        column: String,
        value: String,
        line: usize,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Position of a named column in a header record
pub(crate) fn column_index(header: &[String], name: &str) -> Result<usize, ReportError> {
    header
        .iter()
        .position(|column| column == name)
        .ok_or_else(|| ReportError::MissingColumn(name.to_string()))
}

//! Capacity estimation for sizing the Bloom filter.
//!
//! The estimate is the number of k-mer windows in every record, counted without
//! deduplication. Only files matching the [`EstimateScope`] are scanned. With
//! the default scope (`.fna` and `.fna.gz`) any `.fasta` files that ingestion
//! later indexes are left out of the estimate, so the filter ends up smaller
//! than their k-mers warrant.

use std::io::BufRead;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::IndexError;
use crate::core::kmer::{kmer_count, sequence_len};
use crate::parsing::fasta::{self, FastaRecords, ParseError};
use crate::utils::files::collect_files;

/// Which reference files contribute to the capacity estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateScope {
    /// Only `.fna` and `.fna.gz` files
    #[default]
    FnaOnly,
    /// Every extension the index builder ingests
    AllReferenceFormats,
}

impl EstimateScope {
    /// Check if a file is scanned under this scope
    #[must_use]
    pub fn includes(self, path: &Path) -> bool {
        match self {
            Self::FnaOnly => fasta::is_estimated_file(path),
            Self::AllReferenceFormats => fasta::is_reference_file(path),
        }
    }
}

fn record_windows(sequence: &str, k: usize) -> u64 {
    kmer_count(sequence_len(sequence), k) as u64
}

/// Count the k-mer windows of every record in a stream.
///
/// # Errors
///
/// Returns a `ParseError` if the stream cannot be read.
pub fn estimate_records<R: BufRead>(reader: R, k: usize) -> Result<u64, ParseError> {
    let mut total = 0u64;
    for record in FastaRecords::new(reader) {
        total += record_windows(&record?.sequence, k);
    }
    Ok(total)
}

/// Estimate the k-mer volume of one file.
///
/// A file that cannot be opened is logged and counts as 0. A read failure
/// part way through is logged and the file counts the records completed
/// before it.
#[must_use]
pub fn estimate_file(path: &Path, k: usize) -> u64 {
    debug!("Reading file: {}", path.display());
    let reader = match fasta::open_reader(path) {
        Ok(reader) => reader,
        Err(e) => {
            warn!("Error reading file {}: {e}", path.display());
            return 0;
        }
    };

    let mut total = 0u64;
    for record in FastaRecords::new(reader) {
        match record {
            Ok(record) => total += record_windows(&record.sequence, k),
            Err(e) => {
                warn!(
                    "Error reading file {}: {e} (keeping {total} k-mers counted so far)",
                    path.display()
                );
                break;
            }
        }
    }

    debug!("Estimated k-mers for {}: {total}", path.display());
    total
}

/// Sum of per-file estimates over every in-scope file under `root`.
///
/// # Errors
///
/// Returns `IndexError::Io` if `root` cannot be listed.
pub fn estimate_directory(root: &Path, k: usize, scope: EstimateScope) -> Result<u64, IndexError> {
    let files = collect_files(root)?;
    Ok(estimate_files(&files, k, scope))
}

/// Sum of per-file estimates over the in-scope subset of `files`
#[must_use]
pub fn estimate_files<P: AsRef<Path>>(files: &[P], k: usize, scope: EstimateScope) -> u64 {
    let mut scanned = 0usize;
    let total: u64 = files
        .iter()
        .map(AsRef::<Path>::as_ref)
        .filter(|path| scope.includes(path))
        .inspect(|_| scanned += 1)
        .map(|path| estimate_file(path, k))
        .sum();

    info!("Estimated {total} k-mers across {scanned} files");
    total
}

//! K-mer index construction, storage and persistence.
//!
//! An index has two halves:
//!
//! - a [`BloomFilter`](bloom::BloomFilter) holding every reference k-mer, used
//!   as a cheap first check when matching
//! - a [`ReferenceCatalog`](store::ReferenceCatalog) with the exact reverse
//!   index (k-mer -> references), raw per-reference k-mer counts and the
//!   reference -> accession map
//!
//! ## Building
//!
//! [`IndexBuilder`](builder::IndexBuilder) estimates the corpus k-mer volume,
//! sizes the filter, then ingests reference files in parallel on a fixed-size
//! worker pool.
//!
//! ```rust,no_run
//! use kmer_screen::catalog::builder::{IndexBuilder, IndexConfig};
//! use kmer_screen::catalog::persist;
//! use std::path::Path;
//!
//! let builder = IndexBuilder::new(IndexConfig::default()).unwrap();
//! let index = builder.build(Path::new("references/")).unwrap();
//! let path = persist::save(&index, Path::new("db_bloom")).unwrap();
//!
//! let reloaded = persist::load(&path).unwrap();
//! assert_eq!(reloaded.kmer_size(), index.kmer_size());
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::parsing::fasta::ParseError;
use crate::utils::validation::ConfigError;

pub mod bloom;
pub mod builder;
pub mod estimate;
pub mod index;
pub mod persist;
pub mod store;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Reference directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Estimated k-mers count is zero. Check the database files in {}", .0.display())]
    EmptyEstimate(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: ParseError },

    #[error("Failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Index file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid index file: {0}")]
    InvalidFormat(String),

    #[error("Unsupported index format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Index encoding error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! # kmer-screen
//!
//! A library for screening sequences against a k-mer index of reference genomes.
//!
//! Every k-mer of a reference collection is inserted into a Bloom filter and
//! recorded in an exact reverse index (k-mer -> references). Query sequences
//! are decomposed into k-mers, each probed against the filter, and the
//! survivors attributed to references through the reverse index. Each
//! (query, reference) pair sharing a k-mer is scored with Jaccard similarity
//! and query coverage.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use kmer_screen::{IndexBuilder, IndexConfig, MatchEngine};
//! use kmer_screen::catalog::persist;
//!
//! // Index a directory of .fna / .fasta files (optionally gzipped)
//! let builder = IndexBuilder::new(IndexConfig::default()).unwrap();
//! let index = builder.build(Path::new("references/")).unwrap();
//! persist::save(&index, Path::new("db_bloom")).unwrap();
//!
//! // Score a query against every reference it shares k-mers with
//! let engine = MatchEngine::new(&index);
//! for row in engine.match_sequence("contig_1", "ACGTACGTACGTACGTACGTACGT") {
//!     println!("{} jacc={:.4} qcov={:.4}", row.reference, row.similarity.jaccard, row.similarity.query_coverage);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Bloom filter, reverse index, index building and persistence
//! - [`core`]: k-mer extraction and shared identifiers
//! - [`matching`]: Match engine and similarity scores
//! - [`parsing`]: FASTA records and accession extraction
//! - [`report`]: Result table post-processing (TaxID join, best hits)
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod report;
pub mod utils;

pub use catalog::builder::{IndexBuilder, IndexConfig};
pub use catalog::index::KmerIndex;
pub use catalog::store::ReferenceCatalog;
pub use catalog::IndexError;
pub use core::types::ReferenceId;
pub use matching::{MatchEngine, MatchRow, Similarity};

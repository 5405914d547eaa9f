//! Readers for reference and query inputs.
//!
//! - [`fasta`]: streaming FASTA-style record reader with gzip support
//! - [`accession`]: `GCA_<digits>.<digits>` extraction from file paths
//!
//! ## Example
//!
//! ```rust,no_run
//! use kmer_screen::parsing::fasta::read_file;
//! use std::path::Path;
//!
//! for record in read_file(Path::new("GCA_000123.1_viral.fna.gz")).unwrap() {
//!     let record = record.unwrap();
//!     println!("{}: {} bp", record.reference_id(), record.sequence.len());
//! }
//! ```

pub mod accession;
pub mod fasta;

pub use fasta::ParseError;

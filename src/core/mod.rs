//! Core data types shared by indexing and matching.
//!
//! - [`ReferenceId`]: name of an indexed reference sequence
//! - [`kmer`]: sliding-window k-mer extraction
//!
//! K-mers are plain string slices of the input sequence. They are neither
//! case-normalized nor canonicalized, so `ACG` and `acg` are distinct k-mers.

pub mod kmer;
pub mod types;

pub use types::{ReferenceId, UNKNOWN};

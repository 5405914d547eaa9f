//! Query screening against a loaded k-mer index.
//!
//! - [`MatchEngine`]: attributes query k-mers to references and produces one
//!   [`MatchRow`] per (query, reference) pair sharing at least one k-mer
//! - [`Similarity`]: Jaccard index and query coverage of two k-mer sets
//!
//! ## Scoring
//!
//! For a query k-mer set `Q` and a reference k-mer set `R`:
//!
//! - **Jaccard**: `|Q ∩ R| / |Q ∪ R|`
//! - **Query coverage**: `|Q ∩ R| / |R|`, how much of the reference the
//!   query covers
//!
//! Both are 0 when either set is empty. Query coverage is never smaller than
//! Jaccard.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use kmer_screen::catalog::persist;
//! use kmer_screen::matching::MatchEngine;
//!
//! let index = persist::load(Path::new("index_dir")).unwrap();
//! let engine = MatchEngine::new(&index);
//!
//! for row in engine.match_sequence("q1", "ACGTACGTAC") {
//!     println!("{}: jacc={:.4}", row.reference, row.similarity.jaccard);
//! }
//! ```

pub mod engine;
pub mod scoring;

pub use engine::{MatchEngine, MatchError, MatchRow, MatchSummary, OUTPUT_COLUMNS};
pub use scoring::Similarity;

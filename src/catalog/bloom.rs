//! Fixed-capacity Bloom filter over k-mers.
//!
//! The filter is sized from an expected element count `n` and a target
//! false-positive rate `p`:
//!
//! - bits: `m = ceil(-n * ln(p) / ln(2)^2)`
//! - hash functions: `h = round(m / n * ln(2))`, at least 1
//!
//! Bit positions come from double hashing (`h1 + i * h2 mod m`) over the MD5
//! digest of the k-mer, so a persisted filter probes identically on every
//! platform.
//!
//! Building and querying use two types. [`SharedBloomFilter`] stores atomic
//! words so many build workers can insert through `&self`; it only lives
//! inside the index builder. [`SharedBloomFilter::freeze`] turns it into a
//! [`BloomFilter`], which has no insertion method at all, so a built or
//! loaded index cannot gain members.
//!
//! ```compile_fail
//! # fn probe(index: &kmer_screen::KmerIndex) {
//! index.bloom().insert("ACG");
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::catalog::IndexError;
use crate::utils::validation::validate_error_rate;

/// Default target false-positive rate
pub const DEFAULT_ERROR_RATE: f64 = 0.001;

const WORD_BITS: u64 = 64;

/// Number of bits for `capacity` elements at false-positive rate `error_rate`
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn optimal_num_bits(capacity: u64, error_rate: f64) -> u64 {
    let n = capacity.max(1) as f64;
    let ln2 = std::f64::consts::LN_2;
    let bits = (-n * error_rate.ln() / (ln2 * ln2)).ceil();
    (bits as u64).max(1)
}

/// Number of hash functions for `num_bits` bits holding `capacity` elements
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn optimal_num_hashes(num_bits: u64, capacity: u64) -> u32 {
    let n = capacity.max(1) as f64;
    let hashes = (num_bits as f64 / n * std::f64::consts::LN_2).round();
    (hashes as u32).max(1)
}

/// Size and hashing parameters shared by both filter forms
#[derive(Debug, Clone, Copy, PartialEq)]
struct Shape {
    num_bits: u64,
    num_hashes: u32,
    capacity: u64,
    error_rate: f64,
}

impl Shape {
    fn new(capacity: u64, error_rate: f64) -> Result<Self, IndexError> {
        validate_error_rate(error_rate)?;
        let num_bits = optimal_num_bits(capacity, error_rate);
        Ok(Self {
            num_bits,
            num_hashes: optimal_num_hashes(num_bits, capacity),
            capacity,
            error_rate,
        })
    }

    fn num_words(&self) -> u64 {
        self.num_bits.div_ceil(WORD_BITS)
    }

    fn bit_positions(&self, kmer: &str) -> impl Iterator<Item = u64> {
        let digest = md5::compute(kmer.as_bytes()).0;
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];
        low.copy_from_slice(&digest[..8]);
        high.copy_from_slice(&digest[8..]);
        let h1 = u64::from_le_bytes(low);
        let h2 = u64::from_le_bytes(high) | 1;
        let num_bits = self.num_bits;

        (0..u64::from(self.num_hashes))
            .map(move |i| h1.wrapping_add(i.wrapping_mul(h2)) % num_bits)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn word_index(bit: u64) -> usize {
    (bit / WORD_BITS) as usize
}

fn bit_mask(bit: u64) -> u64 {
    1u64 << (bit % WORD_BITS)
}

/// Filter under construction, written to by many workers at once
#[derive(Debug)]
pub(crate) struct SharedBloomFilter {
    words: Vec<AtomicU64>,
    shape: Shape,
}

impl SharedBloomFilter {
    /// Create an empty filter sized for `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Config` if `error_rate` is not strictly between 0 and 1.
    pub(crate) fn new(capacity: u64, error_rate: f64) -> Result<Self, IndexError> {
        let shape = Shape::new(capacity, error_rate)?;
        let words = (0..shape.num_words()).map(|_| AtomicU64::new(0)).collect();
        Ok(Self { words, shape })
    }

    /// Add a k-mer to the set
    pub(crate) fn insert(&self, kmer: &str) {
        for bit in self.shape.bit_positions(kmer) {
            self.words[word_index(bit)].fetch_or(bit_mask(bit), Ordering::Relaxed);
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, kmer: &str) -> bool {
        self.shape
            .bit_positions(kmer)
            .all(|bit| self.words[word_index(bit)].load(Ordering::Relaxed) & bit_mask(bit) != 0)
    }

    pub(crate) fn num_bits(&self) -> u64 {
        self.shape.num_bits
    }

    pub(crate) fn num_hashes(&self) -> u32 {
        self.shape.num_hashes
    }

    /// Stop accepting inserts and return the read-only filter
    pub(crate) fn freeze(self) -> BloomFilter {
        BloomFilter {
            words: self.words.into_iter().map(AtomicU64::into_inner).collect(),
            shape: self.shape,
        }
    }
}

/// Probabilistic membership set: no false negatives, bounded false positives.
///
/// Read-only; obtained from a finished build or from a persisted
/// [`BloomState`].
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    words: Vec<u64>,
    shape: Shape,
}

impl BloomFilter {
    /// Returns `false` only if the k-mer was never inserted
    #[must_use]
    pub fn contains(&self, kmer: &str) -> bool {
        self.shape
            .bit_positions(kmer)
            .all(|bit| self.words[word_index(bit)] & bit_mask(bit) != 0)
    }

    /// Total number of bits in the filter
    #[must_use]
    pub fn num_bits(&self) -> u64 {
        self.shape.num_bits
    }

    /// Number of hash functions applied per k-mer
    #[must_use]
    pub fn num_hashes(&self) -> u32 {
        self.shape.num_hashes
    }

    /// Element count the filter was sized for
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.shape.capacity
    }

    /// Target false-positive rate at capacity
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        self.shape.error_rate
    }

    /// Number of bits currently set
    #[must_use]
    pub fn count_set_bits(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }
}

/// Plain-data snapshot of a filter, used for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomState {
    pub num_bits: u64,
    pub num_hashes: u32,
    pub capacity: u64,
    pub error_rate: f64,
    pub words: Vec<u64>,
}

impl From<&BloomFilter> for BloomState {
    fn from(filter: &BloomFilter) -> Self {
        Self {
            num_bits: filter.shape.num_bits,
            num_hashes: filter.shape.num_hashes,
            capacity: filter.shape.capacity,
            error_rate: filter.shape.error_rate,
            words: filter.words.clone(),
        }
    }
}

impl TryFrom<BloomState> for BloomFilter {
    type Error = IndexError;

    fn try_from(state: BloomState) -> Result<Self, Self::Error> {
        if state.num_bits == 0 || state.num_hashes == 0 {
            return Err(IndexError::InvalidFormat(
                "Bloom filter has no bits or no hash functions".to_string(),
            ));
        }
        let shape = Shape {
            num_bits: state.num_bits,
            num_hashes: state.num_hashes,
            capacity: state.capacity,
            error_rate: state.error_rate,
        };
        let expected_words = shape.num_words();
        if state.words.len() as u64 != expected_words {
            return Err(IndexError::InvalidFormat(format!(
                "Bloom filter has {} words, expected {expected_words} for {} bits",
                state.words.len(),
                state.num_bits
            )));
        }

        Ok(Self {
            words: state.words,
            shape,
        })
    }
}

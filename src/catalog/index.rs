use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::bloom::BloomFilter;
use crate::catalog::store::ReferenceCatalog;
use crate::core::types::ReferenceId;

/// A built k-mer index: Bloom filter plus exact reference catalog.
///
/// Built once, then only read. Matching borrows it immutably, so a loaded
/// index can serve several query streams at the same time.
#[derive(Debug)]
pub struct KmerIndex {
    kmer_size: usize,
    created_at: String,
    bloom: BloomFilter,
    catalog: ReferenceCatalog,
}

impl KmerIndex {
    pub fn new(kmer_size: usize, bloom: BloomFilter, catalog: ReferenceCatalog) -> Self {
        Self::with_created_at(kmer_size, bloom, catalog, chrono::Utc::now().to_rfc3339())
    }

    pub fn with_created_at(
        kmer_size: usize,
        bloom: BloomFilter,
        catalog: ReferenceCatalog,
        created_at: String,
    ) -> Self {
        Self {
            kmer_size,
            created_at,
            bloom,
            catalog,
        }
    }

    /// Length of the k-mers this index was built with
    #[must_use]
    pub fn kmer_size(&self) -> usize {
        self.kmer_size
    }

    /// RFC 3339 build timestamp
    #[must_use]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    #[must_use]
    pub fn bloom(&self) -> &BloomFilter {
        &self.bloom
    }

    #[must_use]
    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    /// References containing a k-mer.
    ///
    /// The Bloom filter is probed first and the reverse index is consulted only
    /// on a positive probe. A false positive finds no catalog entry and yields
    /// `None`, so it never attributes the k-mer to a reference.
    #[must_use]
    pub fn probe(&self, kmer: &str) -> Option<&HashSet<ReferenceId>> {
        if self.bloom.contains(kmer) {
            self.catalog.references_for(kmer)
        } else {
            None
        }
    }

    /// Parameters and sizes for reporting
    #[must_use]
    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            kmer_size: self.kmer_size,
            created_at: self.created_at.clone(),
            capacity: self.bloom.capacity(),
            error_rate: self.bloom.error_rate(),
            num_bits: self.bloom.num_bits(),
            num_hashes: self.bloom.num_hashes(),
            set_bits: self.bloom.count_set_bits(),
            distinct_kmers: self.catalog.distinct_kmers(),
            references: self.catalog.len(),
        }
    }
}

/// Index parameters and sizes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSummary {
    pub kmer_size: usize,
    pub created_at: String,
    pub capacity: u64,
    pub error_rate: f64,
    pub num_bits: u64,
    pub num_hashes: u32,
    pub set_bits: u64,
    pub distinct_kmers: usize,
    pub references: usize,
}

impl IndexSummary {
    /// Fraction of filter bits that are set
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_ratio(&self) -> f64 {
        if self.num_bits == 0 {
            0.0
        } else {
            self.set_bits as f64 / self.num_bits as f64
        }
    }
}

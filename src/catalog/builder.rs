//! Index builder: estimation, filter sizing and parallel ingestion.
//!
//! Reference files are processed on a dedicated rayon pool with a fixed number
//! of workers. Each worker inserts k-mers straight into the shared Bloom filter
//! (atomic bit setting) and fills a private [`ReferenceCatalog`] for its file.
//! Once every worker has finished, the per-file catalogs are merged in file
//! order and the filter is frozen read-only. No partially built index is ever
//! returned; a failure in any file aborts the build.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::catalog::bloom::{SharedBloomFilter, DEFAULT_ERROR_RATE};
use crate::catalog::estimate::{estimate_files, EstimateScope};
use crate::catalog::index::KmerIndex;
use crate::catalog::store::ReferenceCatalog;
use crate::catalog::IndexError;
use crate::core::kmer::{self, DEFAULT_KMER_SIZE};
use crate::parsing::accession::accession_from_path;
use crate::parsing::fasta;
use crate::utils::files::collect_files;
use crate::utils::validation::{validate_error_rate, validate_kmer_size, ConfigError};

/// Default multiplier applied to the estimated k-mer count when sizing the filter
pub const DEFAULT_CAPACITY_FACTOR: u64 = 4;

/// Default number of ingestion workers
pub const DEFAULT_THREADS: usize = 4;

/// Configuration for building an index
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// k-mer length
    pub kmer_size: usize,
    /// Filter is sized for `estimate * factor` elements
    pub factor: u64,
    /// Target false-positive rate of the filter
    pub error_rate: f64,
    /// Number of ingestion workers
    pub threads: usize,
    /// Files included in the capacity estimate
    pub estimate_scope: EstimateScope,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            kmer_size: DEFAULT_KMER_SIZE,
            factor: DEFAULT_CAPACITY_FACTOR,
            error_rate: DEFAULT_ERROR_RATE,
            threads: DEFAULT_THREADS,
            estimate_scope: EstimateScope::default(),
        }
    }
}

impl IndexConfig {
    /// Check every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigError` of the first invalid parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_kmer_size(self.kmer_size)?;
        validate_error_rate(self.error_rate)?;
        if self.factor == 0 {
            return Err(ConfigError::Factor);
        }
        if self.threads == 0 {
            return Err(ConfigError::Threads);
        }
        Ok(())
    }
}

/// Builds a [`KmerIndex`] from a directory of reference files
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    config: IndexConfig,
}

impl IndexBuilder {
    /// Create a builder with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Config` if the configuration is invalid.
    pub fn new(config: IndexConfig) -> Result<Self, IndexError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Build an index over every reference file under `root`.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::MissingDirectory` if `root` is not a directory,
    /// `IndexError::EmptyEstimate` if there is nothing to index,
    /// `IndexError::Read` if any reference file fails to read, or
    /// `IndexError::ThreadPool` if the worker pool cannot be started.
    pub fn build(&self, root: &Path) -> Result<KmerIndex, IndexError> {
        if !root.is_dir() {
            return Err(IndexError::MissingDirectory(root.to_path_buf()));
        }

        let k = self.config.kmer_size;
        let files = collect_files(root)?;

        let estimated = estimate_files(&files, k, self.config.estimate_scope);
        if estimated == 0 {
            return Err(IndexError::EmptyEstimate(root.to_path_buf()));
        }

        let capacity = estimated.saturating_mul(self.config.factor);
        let bloom = SharedBloomFilter::new(capacity, self.config.error_rate)?;
        info!(
            "Initializing Bloom filter with capacity {capacity} ({} bits, {} hashes)",
            bloom.num_bits(),
            bloom.num_hashes()
        );

        let inputs: Vec<&PathBuf> = files
            .iter()
            .filter(|path| fasta::is_reference_file(path))
            .collect();
        info!(
            "Indexing {} reference files with {} workers",
            inputs.len(),
            self.config.threads
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("kmer-screen-build-{i}"))
            .build()?;

        let partials: Vec<ReferenceCatalog> = pool.install(|| {
            inputs
                .par_iter()
                .map(|path| ingest_file(path, k, &bloom))
                .collect::<Result<Vec<_>, _>>()
        })?;

        let mut catalog = ReferenceCatalog::new();
        for partial in partials {
            catalog.merge(partial);
        }

        info!(
            "Indexed {} distinct k-mers from {} references",
            catalog.distinct_kmers(),
            catalog.len()
        );

        Ok(KmerIndex::new(k, bloom.freeze(), catalog))
    }
}

/// Read one reference file into the shared filter and a per-file catalog.
///
/// The accession is taken from the path once and applies to every record in
/// the file. Records with an empty body still get their accession recorded.
///
/// # Errors
///
/// Returns `IndexError::Read` if the file cannot be opened or read.
pub(crate) fn ingest_file(
    path: &Path,
    k: usize,
    bloom: &SharedBloomFilter,
) -> Result<ReferenceCatalog, IndexError> {
    let read_error = |source| IndexError::Read {
        path: path.to_path_buf(),
        source,
    };

    let accession = accession_from_path(path);
    let mut catalog = ReferenceCatalog::new();
    let mut total = 0u64;

    for record in fasta::read_file(path).map_err(read_error)? {
        let record = record.map_err(read_error)?;
        let reference = record.reference_id();
        catalog.record_accession(&reference, &accession);

        if record.sequence.is_empty() {
            continue;
        }

        let kmers = kmer::extract(&record.sequence, k);
        for kmer in &kmers {
            bloom.insert(kmer);
        }
        let added = catalog.add_kmers(&reference, kmers);
        debug!("Reference Name: {reference}, Extracted k-mers: {added}");
        total += added;
    }

    info!("Loaded {total} k-mers from {} ({accession})", path.display());
    Ok(catalog)
}

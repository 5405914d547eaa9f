//! Centralized validation of user-supplied parameters.

/// Configuration validation error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("k-mer size must be at least 1")]
    KmerSize,
    #[error("False-positive rate must be strictly between 0 and 1, got {0}")]
    ErrorRate(f64),
    #[error("Capacity factor must be at least 1")]
    Factor,
    #[error("Worker thread count must be at least 1")]
    Threads,
    #[error("{name} threshold must be between 0 and 1, got {value}")]
    Threshold { name: &'static str, value: f64 },
}

/// Validate a k-mer length.
///
/// # Errors
///
/// Returns `ConfigError::KmerSize` when `k` is 0.
pub fn validate_kmer_size(k: usize) -> Result<(), ConfigError> {
    if k == 0 {
        Err(ConfigError::KmerSize)
    } else {
        Ok(())
    }
}

/// Validate a Bloom filter target false-positive rate.
///
/// # Errors
///
/// Returns `ConfigError::ErrorRate` unless `0 < rate < 1`.
pub fn validate_error_rate(rate: f64) -> Result<(), ConfigError> {
    if rate > 0.0 && rate < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::ErrorRate(rate))
    }
}

/// Validate a similarity threshold.
///
/// # Errors
///
/// Returns `ConfigError::Threshold` unless `0 <= value <= 1`.
pub fn validate_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Threshold { name, value })
    }
}

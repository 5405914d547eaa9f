//! Sliding-window decomposition of sequences into k-mers.
//!
//! Windows are taken with stride 1, so a sequence of `L` characters yields
//! `L - k + 1` overlapping k-mers when `L >= k` and none otherwise. Lengths are
//! counted in characters: bytes outside the nucleotide alphabet pass through
//! unchanged and a multi-byte character is never split across windows.
//!
//! ```
//! use kmer_screen::core::kmer::extract;
//!
//! assert_eq!(extract("ACGTA", 3), vec!["ACG", "CGT", "GTA"]);
//! assert!(extract("AC", 3).is_empty());
//! ```

/// Default k-mer length
pub const DEFAULT_KMER_SIZE: usize = 21;

/// Length of a sequence in characters
#[must_use]
pub fn sequence_len(sequence: &str) -> usize {
    if sequence.is_ascii() {
        sequence.len()
    } else {
        sequence.chars().count()
    }
}

/// Number of k-mers a sequence of `len` characters yields.
#[must_use]
pub fn kmer_count(len: usize, k: usize) -> usize {
    if k == 0 || len < k {
        0
    } else {
        len - k + 1
    }
}

/// Extract every k-mer of `sequence`, in left-to-right positional order.
///
/// Returns an empty vector when the sequence is shorter than `k` or `k` is 0.
/// The input is not trimmed; callers strip whitespace beforehand.
#[must_use]
pub fn extract(sequence: &str, k: usize) -> Vec<&str> {
    if k == 0 {
        return Vec::new();
    }

    if sequence.is_ascii() {
        let count = kmer_count(sequence.len(), k);
        return (0..count).map(|start| &sequence[start..start + k]).collect();
    }

    // Byte offset of every character, plus the end of the string
    let bounds: Vec<usize> = sequence
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(sequence.len()))
        .collect();

    bounds
        .iter()
        .zip(bounds.iter().skip(k))
        .map(|(&start, &end)| &sequence[start..end])
        .collect()
}

use std::collections::HashSet;
use std::hash::Hash;

/// Safely convert usize to f64 for ratio calculations
///
/// K-mer set sizes stay far below 2^53, so the conversion is exact in practice.
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Similarity between a query k-mer set and a reference k-mer set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Jaccard index: |Q ∩ R| / |Q ∪ R|
    pub jaccard: f64,

    /// Fraction of the reference k-mers found in the query: |Q ∩ R| / |R|
    pub query_coverage: f64,
}

impl Similarity {
    /// Score a query set against a reference set.
    ///
    /// Both scores are 0.0 when either set is empty. Because
    /// `|Q ∩ R| <= |R| <= |Q ∪ R|`, the result always satisfies
    /// `0 <= jaccard <= query_coverage <= 1`.
    #[must_use]
    pub fn calculate<T: Eq + Hash>(query: &HashSet<T>, reference: &HashSet<T>) -> Self {
        if query.is_empty() || reference.is_empty() {
            return Self {
                jaccard: 0.0,
                query_coverage: 0.0,
            };
        }

        let intersection = intersection_size(query, reference);
        let union = query.len() + reference.len() - intersection;

        Self {
            jaccard: count_to_f64(intersection) / count_to_f64(union),
            query_coverage: count_to_f64(intersection) / count_to_f64(reference.len()),
        }
    }
}

/// |A ∩ B|, iterating over the smaller set
fn intersection_size<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> usize {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|item| large.contains(item)).count()
}

/// Format a score with four decimal places
#[must_use]
pub fn format_score(score: f64) -> String {
    format!("{score:.4}")
}

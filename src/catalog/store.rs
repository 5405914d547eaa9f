use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::core::types::{ReferenceId, UNKNOWN};

/// Exact bookkeeping for every indexed reference.
///
/// The catalog is the ground truth for attribution: the Bloom filter only
/// decides whether a k-mer is worth looking up here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    /// Reverse index: k-mer -> references containing it (deduplicated)
    kmer_to_references: HashMap<String, HashSet<ReferenceId>>,

    /// Raw extraction count per reference, duplicates included
    reference_kmer_counts: HashMap<ReferenceId, u64>,

    /// Reference -> assembly accession of the file it came from
    reference_accessions: HashMap<ReferenceId, String>,
}

impl ReferenceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the accession of the file a reference was read from.
    ///
    /// A later call for the same reference replaces the earlier accession.
    pub fn record_accession(&mut self, reference: &ReferenceId, accession: &str) {
        self.reference_accessions
            .insert(reference.clone(), accession.to_string());
    }

    /// Attribute k-mers to a reference.
    ///
    /// Every k-mer is added to the reverse index, and the raw count of the
    /// reference grows by the number of k-mers given, duplicates included.
    /// Returns that number.
    pub fn add_kmers<'k>(
        &mut self,
        reference: &ReferenceId,
        kmers: impl IntoIterator<Item = &'k str>,
    ) -> u64 {
        let mut added = 0u64;
        for kmer in kmers {
            added += 1;
            if let Some(references) = self.kmer_to_references.get_mut(kmer) {
                if !references.contains(reference) {
                    references.insert(reference.clone());
                }
            } else {
                self.kmer_to_references
                    .insert(kmer.to_string(), HashSet::from([reference.clone()]));
            }
        }

        *self
            .reference_kmer_counts
            .entry(reference.clone())
            .or_default() += added;
        added
    }

    /// Fold another catalog into this one.
    ///
    /// Reverse-index entries are unioned and raw counts summed; accessions from
    /// `other` replace existing ones for the same reference.
    pub fn merge(&mut self, other: ReferenceCatalog) {
        for (kmer, references) in other.kmer_to_references {
            match self.kmer_to_references.entry(kmer) {
                Entry::Occupied(mut entry) => entry.get_mut().extend(references),
                Entry::Vacant(entry) => {
                    entry.insert(references);
                }
            }
        }

        for (reference, count) in other.reference_kmer_counts {
            *self.reference_kmer_counts.entry(reference).or_default() += count;
        }

        self.reference_accessions.extend(other.reference_accessions);
    }

    /// References whose sequence contains this exact k-mer
    #[must_use]
    pub fn references_for(&self, kmer: &str) -> Option<&HashSet<ReferenceId>> {
        self.kmer_to_references.get(kmer)
    }

    /// Deduplicated k-mer set of a reference.
    ///
    /// Scans the whole reverse index, so the cost grows with the number of
    /// distinct k-mers in the catalog rather than with the reference size.
    #[must_use]
    pub fn kmers_for(&self, reference: &ReferenceId) -> HashSet<&str> {
        self.kmer_to_references
            .iter()
            .filter(|(_, references)| references.contains(reference))
            .map(|(kmer, _)| kmer.as_str())
            .collect()
    }

    /// Raw k-mer extraction count of a reference, 0 if unknown
    #[must_use]
    pub fn raw_count(&self, reference: &ReferenceId) -> u64 {
        self.reference_kmer_counts
            .get(reference)
            .copied()
            .unwrap_or(0)
    }

    /// Assembly accession of a reference, `"Unknown"` if never recorded
    #[must_use]
    pub fn accession_of(&self, reference: &ReferenceId) -> &str {
        self.reference_accessions
            .get(reference)
            .map_or(UNKNOWN, String::as_str)
    }

    /// Every distinct k-mer in the reverse index
    pub fn kmers(&self) -> impl Iterator<Item = &str> {
        self.kmer_to_references.keys().map(String::as_str)
    }

    /// Number of distinct k-mers in the reverse index
    #[must_use]
    pub fn distinct_kmers(&self) -> usize {
        self.kmer_to_references.len()
    }

    /// All known reference ids, sorted
    #[must_use]
    pub fn reference_ids(&self) -> Vec<&ReferenceId> {
        let mut ids: Vec<&ReferenceId> = self
            .reference_kmer_counts
            .keys()
            .chain(self.reference_accessions.keys())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        ids.sort();
        ids
    }

    /// Number of known references
    #[must_use]
    pub fn len(&self) -> usize {
        self.reference_ids().len()
    }

    /// Check if catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reference_kmer_counts.is_empty() && self.reference_accessions.is_empty()
    }
}

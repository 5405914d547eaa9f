use std::collections::{BTreeMap, HashSet};
use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::index::KmerIndex;
use crate::core::kmer;
use crate::core::types::ReferenceId;
use crate::matching::scoring::{format_score, Similarity};
use crate::parsing::fasta::{FastaRecords, ParseError};
use crate::report::table::write_record;

/// Column names of the match output, in order
pub const OUTPUT_COLUMNS: [&str; 8] = [
    "Sequence Name",
    "Total Input k-mers",
    "Reference",
    "Matched k-mers",
    "Reference Total k-mers",
    "GCA Name",
    "Jacc",
    "Qcov",
];

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Failed to read query sequences: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to write match results: {0}")]
    Io(#[from] std::io::Error),
}

/// One (query, reference) similarity row
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    /// Name of the query sequence
    pub sequence_name: String,

    /// Distinct k-mers in the query
    pub total_query_kmers: usize,

    /// Reference that shares at least one k-mer with the query
    pub reference: ReferenceId,

    /// Distinct query k-mers attributed to the reference
    pub matched_kmers: usize,

    /// Raw (duplicate-inclusive) k-mer count of the reference
    pub reference_total_kmers: u64,

    /// Assembly accession of the reference
    pub accession: String,

    pub similarity: Similarity,
}

impl MatchRow {
    /// Output fields in [`OUTPUT_COLUMNS`] order, scores at four decimals
    #[must_use]
    pub fn to_fields(&self) -> [String; 8] {
        [
            self.sequence_name.clone(),
            self.total_query_kmers.to_string(),
            self.reference.to_string(),
            self.matched_kmers.to_string(),
            self.reference_total_kmers.to_string(),
            self.accession.clone(),
            format_score(self.similarity.jaccard),
            format_score(self.similarity.query_coverage),
        ]
    }
}

/// Totals of a matching run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    /// Query records processed
    pub queries: usize,
    /// Rows emitted
    pub rows: usize,
    /// Queries with at least one row
    pub matched_queries: usize,
}

/// Scores query sequences against a loaded index
#[derive(Debug, Clone, Copy)]
pub struct MatchEngine<'a> {
    index: &'a KmerIndex,
}

impl<'a> MatchEngine<'a> {
    pub fn new(index: &'a KmerIndex) -> Self {
        Self { index }
    }

    /// Score one query sequence against every reference it shares a k-mer with.
    ///
    /// Rows are ordered by reference id. References with no shared k-mer
    /// produce no row.
    #[must_use]
    pub fn match_sequence(&self, name: &str, sequence: &str) -> Vec<MatchRow> {
        let catalog = self.index.catalog();
        let query: HashSet<&str> = kmer::extract(sequence, self.index.kmer_size())
            .into_iter()
            .collect();

        let mut matches: BTreeMap<&ReferenceId, HashSet<&str>> = BTreeMap::new();
        for &kmer in &query {
            if let Some(references) = self.index.probe(kmer) {
                for reference in references {
                    matches.entry(reference).or_default().insert(kmer);
                }
            }
        }

        matches
            .into_iter()
            .map(|(reference, matched)| {
                let reference_kmers = catalog.kmers_for(reference);
                let similarity = Similarity::calculate(&query, &reference_kmers);
                let row = MatchRow {
                    sequence_name: name.to_string(),
                    total_query_kmers: query.len(),
                    reference: reference.clone(),
                    matched_kmers: matched.len(),
                    reference_total_kmers: catalog.raw_count(reference),
                    accession: catalog.accession_of(reference).to_string(),
                    similarity,
                };
                debug!(
                    "Sequence Name: {name}, Total Input k-mers: {}, Reference: {reference}, \
                     Matched k-mers: {}, Reference Total k-mers: {}, Jacc: {}, Qcov: {}",
                    row.total_query_kmers,
                    row.matched_kmers,
                    row.reference_total_kmers,
                    similarity.jaccard,
                    similarity.query_coverage
                );
                row
            })
            .collect()
    }

    /// Match every record of a FASTA stream, writing CSV rows as they are produced.
    ///
    /// The header row is written first; each query's rows are written before
    /// the next query is read.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::Parse` if a query record cannot be read, or
    /// `MatchError::Io` if writing fails.
    pub fn match_records<R: BufRead, W: Write>(
        &self,
        records: FastaRecords<R>,
        writer: &mut W,
    ) -> Result<MatchSummary, MatchError> {
        write_record(writer, &OUTPUT_COLUMNS)?;

        let mut summary = MatchSummary::default();
        for record in records {
            let record = record?;
            let name = record.reference_id();
            let rows = self.match_sequence(name.as_str(), &record.sequence);

            summary.queries += 1;
            summary.rows += rows.len();
            if !rows.is_empty() {
                summary.matched_queries += 1;
            }
            for row in &rows {
                write_record(writer, &row.to_fields())?;
            }
        }
        writer.flush()?;

        info!(
            "Matched {} of {} query sequences ({} rows)",
            summary.matched_queries, summary.queries, summary.rows
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::bloom::{SharedBloomFilter, DEFAULT_ERROR_RATE};
    use crate::catalog::store::ReferenceCatalog;
    use std::io::Cursor;

    fn make_index(references: &[(&str, &str, &str)], k: usize) -> KmerIndex {
        make_index_with_filter_only(references, &[], k)
    }

    /// `filter_only` k-mers are set in the filter but absent from the catalog
    fn make_index_with_filter_only(
        references: &[(&str, &str, &str)],
        filter_only: &[&str],
        k: usize,
    ) -> KmerIndex {
        let bloom = SharedBloomFilter::new(1000, DEFAULT_ERROR_RATE).unwrap();
        for kmer in filter_only {
            bloom.insert(kmer);
        }
        let mut catalog = ReferenceCatalog::new();
        for (name, sequence, accession) in references {
            let id = ReferenceId::new(*name);
            let kmers = kmer::extract(sequence, k);
            for kmer in &kmers {
                bloom.insert(kmer);
            }
            catalog.add_kmers(&id, kmers);
            catalog.record_accession(&id, accession);
        }
        KmerIndex::new(k, bloom.freeze(), catalog)
    }

    #[test]
    fn test_identical_query() {
        let index = make_index(&[("ref1", "ACGTACGT", "GCA_000123.1")], 3);
        let engine = MatchEngine::new(&index);

        let rows = engine.match_sequence("q1", "ACGTACGT");
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.total_query_kmers, 4);
        assert_eq!(row.matched_kmers, 4);
        assert_eq!(row.reference_total_kmers, 6);
        assert_eq!(row.accession, "GCA_000123.1");

        let fields = row.to_fields();
        assert_eq!(fields[6], "1.0000");
        assert_eq!(fields[7], "1.0000");
    }

    #[test]
    fn test_disjoint_query_has_no_rows() {
        let index = make_index(&[("ref1", "ACGTACGT", "GCA_000123.1")], 3);
        let engine = MatchEngine::new(&index);
        assert!(engine.match_sequence("q1", "TTTTTTTT").is_empty());
        assert!(engine.match_sequence("q2", "AC").is_empty());
    }

    #[test]
    fn test_partial_match_scores() {
        let index = make_index(&[("ref1", "AAAACCCC", "Unknown")], 4);
        let engine = MatchEngine::new(&index);

        // Query k-mers: AAAA AAAC AACC ACCG; reference: AAAA AAAC AACC ACCC CCCC
        let rows = engine.match_sequence("q1", "AAAACCG");
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.matched_kmers, 3);
        // |Q ∩ R| = 3, |Q ∪ R| = 6, |R| = 5
        assert!((row.similarity.jaccard - 0.5).abs() < 1e-12);
        assert!((row.similarity.query_coverage - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_rows_sorted_by_reference() {
        let index = make_index(
            &[
                ("zeta", "ACGTACGT", "GCA_3.1"),
                ("alpha", "ACGTTT", "GCA_1.1"),
                ("mid", "GGGACG", "GCA_2.1"),
            ],
            3,
        );
        let engine = MatchEngine::new(&index);

        let rows = engine.match_sequence("q1", "ACGT");
        let references: Vec<&str> = rows.iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(references, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_filter_false_positive_is_ignored() {
        // TTT passes the filter but no reference holds it
        let index =
            make_index_with_filter_only(&[("ref1", "ACGTACGT", "GCA_1.1")], &["TTT"], 3);
        assert!(index.bloom().contains("TTT"));
        let engine = MatchEngine::new(&index);

        assert!(engine.match_sequence("q1", "TTTTT").is_empty());
    }

    #[test]
    fn test_match_records_writes_csv() {
        let index = make_index(&[("ref1", "ACGTACGT", "GCA_000123.1")], 3);
        let engine = MatchEngine::new(&index);

        let input = ">q1 first\nACGTACGT\n>q2\nTTTTTT\n";
        let records = FastaRecords::new(Cursor::new(input.as_bytes().to_vec()));
        let mut output = Vec::new();
        let summary = engine.match_records(records, &mut output).unwrap();

        assert_eq!(
            summary,
            MatchSummary {
                queries: 2,
                rows: 1,
                matched_queries: 1
            }
        );

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Sequence Name,Total Input k-mers,Reference,Matched k-mers,Reference Total k-mers,GCA Name,Jacc,Qcov"
        );
        assert_eq!(lines[1], "q1,4,ref1,4,6,GCA_000123.1,1.0000,1.0000");
        assert_eq!(lines.len(), 2);
    }
}

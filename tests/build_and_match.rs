//! End-to-end tests of index building, persistence and matching
//!
//! These drive the library over small on-disk reference corpora, including
//! gzipped inputs, and check the match rows survive a save/load cycle.

use std::io::{Cursor, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use kmer_screen::catalog::persist;
use kmer_screen::parsing::fasta::FastaRecords;
use kmer_screen::{IndexBuilder, IndexConfig, KmerIndex, MatchEngine, ReferenceId};
use tempfile::TempDir;

fn write_gz(path: &Path, text: &str) {
    let file = std::fs::File::create(path).expect("Failed to create gz fixture");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(text.as_bytes())
        .expect("Failed to write gz fixture");
    encoder.finish().expect("Failed to finish gz fixture");
}

/// Two references in two files: one plain, one gzipped with a wrapped sequence
fn reference_corpus() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("GCA_000123.1_viral.fna"),
        ">ref1 Example virus, complete genome\nACGTACGT\n",
    )
    .expect("Failed to write fixture");

    let nested = dir.path().join("nested");
    std::fs::create_dir(&nested).expect("Failed to create nested dir");
    write_gz(
        &nested.join("GCA_000456.2_other.fna.gz"),
        ">ref2\nGGGGCCCC\nAAAA\n",
    );

    std::fs::write(dir.path().join("README.txt"), ">not_a_reference\nACGT\n")
        .expect("Failed to write fixture");
    dir
}

fn build_index(root: &Path) -> KmerIndex {
    let config = IndexConfig {
        kmer_size: 3,
        ..IndexConfig::default()
    };
    IndexBuilder::new(config)
        .expect("Valid config")
        .build(root)
        .expect("Index should build")
}

fn screen(index: &KmerIndex, queries: &str) -> String {
    let mut out = Vec::new();
    MatchEngine::new(index)
        .match_records(FastaRecords::new(Cursor::new(queries.to_string())), &mut out)
        .expect("Matching should succeed");
    String::from_utf8(out).expect("CSV is UTF-8")
}

#[test]
fn test_build_records_every_reference() {
    let corpus = reference_corpus();
    let index = build_index(corpus.path());
    let catalog = index.catalog();

    assert_eq!(catalog.len(), 2);
    let ref1 = ReferenceId::new("ref1");
    let ref2 = ReferenceId::new("ref2");

    assert_eq!(catalog.raw_count(&ref1), 6);
    assert_eq!(catalog.kmers_for(&ref1).len(), 4);
    assert_eq!(catalog.accession_of(&ref1), "GCA_000123.1");

    // Wrapped lines are joined: GGGGCCCCAAAA has 10 windows
    assert_eq!(catalog.raw_count(&ref2), 10);
    assert_eq!(catalog.accession_of(&ref2), "GCA_000456.2");

    // .txt files are never ingested
    assert!(catalog
        .reference_ids()
        .iter()
        .all(|id| id.as_str() != "not_a_reference"));

    // Every cataloged k-mer is in the filter
    for kmer in catalog.kmers() {
        assert!(index.bloom().contains(kmer), "filter missing {kmer}");
    }
}

#[test]
fn test_identical_query_scores_one() {
    let corpus = reference_corpus();
    let index = build_index(corpus.path());

    let csv = screen(&index, ">q1\nACGTACGT\n");
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(
        lines[0],
        "Sequence Name,Total Input k-mers,Reference,Matched k-mers,Reference Total k-mers,GCA Name,Jacc,Qcov"
    );
    assert_eq!(lines[1], "q1,4,ref1,4,6,GCA_000123.1,1.0000,1.0000");
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_disjoint_query_emits_no_rows() {
    let corpus = reference_corpus();
    let index = build_index(corpus.path());

    let csv = screen(&index, ">q1\nTTTTTTTT\n");
    assert_eq!(csv.lines().count(), 1, "only the header is expected");
}

#[test]
fn test_results_identical_after_reload() {
    let corpus = reference_corpus();
    let index = build_index(corpus.path());

    let db = tempfile::tempdir().expect("Failed to create temp dir");
    let path = persist::save(&index, &db.path().join("db_bloom")).expect("Save should succeed");
    let reloaded = persist::load(&path).expect("Load should succeed");

    assert_eq!(reloaded.kmer_size(), index.kmer_size());
    assert_eq!(reloaded.catalog(), index.catalog());

    let queries = ">q1 first\nACGTACGT\n>q2\nGGGGCCCCAAAAACGT\n>q3\nTTTTTT\n";
    assert_eq!(screen(&reloaded, queries), screen(&index, queries));
}

#[test]
fn test_screening_leaves_loaded_filter_unchanged() {
    let corpus = reference_corpus();
    let index = build_index(corpus.path());
    let db = tempfile::tempdir().expect("Failed to create temp dir");
    let path = persist::save(&index, db.path()).expect("Save should succeed");
    let loaded = persist::load(&path).expect("Load should succeed");

    let set_bits = loaded.bloom().count_set_bits();
    let before = loaded.bloom().clone();
    screen(&loaded, ">q1\nACGTACGT\n>q2\nTTTTTTTT\n");

    assert_eq!(loaded.bloom().count_set_bits(), set_bits);
    assert_eq!(loaded.bloom(), &before);
    assert_eq!(loaded.bloom(), index.bloom());
}

#[test]
fn test_scores_are_bounded() {
    let corpus = reference_corpus();
    let index = build_index(corpus.path());
    let engine = MatchEngine::new(&index);

    for query in ["ACGTACGT", "ACGTTT", "GGGGCC", "CCAAAAACGTA", "GTACG"] {
        for row in engine.match_sequence("q", query) {
            let s = row.similarity;
            assert!(s.jaccard > 0.0, "rows only exist for shared k-mers");
            assert!(s.jaccard <= s.query_coverage, "{query}: {s:?}");
            assert!(s.query_coverage <= 1.0, "{query}: {s:?}");
            assert!(row.matched_kmers <= row.total_query_kmers);
        }
    }
}

#[test]
fn test_build_is_independent_of_thread_count() {
    let corpus = reference_corpus();
    let single = IndexBuilder::new(IndexConfig {
        kmer_size: 3,
        threads: 1,
        ..IndexConfig::default()
    })
    .expect("Valid config")
    .build(corpus.path())
    .expect("Index should build");
    let parallel = build_index(corpus.path());

    assert_eq!(single.catalog(), parallel.catalog());
}

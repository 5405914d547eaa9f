//! Command-line tests for the `kmer-screen` binary

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kmer_screen() -> Command {
    Command::cargo_bin("kmer-screen").expect("Binary should be built")
}

fn corpus() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let refs = dir.path().join("refs");
    std::fs::create_dir(&refs).expect("Failed to create refs dir");
    std::fs::write(
        refs.join("GCA_000123.1_viral.fna"),
        ">ref1 Example virus\nACGTACGT\n",
    )
    .expect("Failed to write fixture");
    std::fs::write(refs.join("GCA_000777.1_phage.fna"), ">ref2\nTTTTGGGG\n")
        .expect("Failed to write fixture");
    std::fs::write(
        dir.path().join("queries.fasta"),
        ">q1\nACGTACGT\n>q2\nTTTTGG\n>q3\nCCCCCC\n",
    )
    .expect("Failed to write fixture");
    std::fs::write(dir.path().join("taxid.map"), "GCA_000123.1\t10239\n")
        .expect("Failed to write fixture");
    dir
}

fn build(dir: &Path) {
    kmer_screen()
        .args(["build", "-i", "refs", "-o", "db_bloom", "-k", "3"])
        .current_dir(dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Index written to"));
}

#[test]
fn test_help() {
    kmer_screen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("screen"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_build_writes_index() {
    let dir = corpus();
    build(dir.path());
    assert!(dir.path().join("db_bloom/bloom_filter.bin").is_file());
}

#[test]
fn test_build_missing_directory_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    kmer_screen()
        .args(["build", "-i", "absent", "-o", "db_bloom"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Reference directory not found"));
}

#[test]
fn test_build_rejects_bad_error_rate() {
    let dir = corpus();
    kmer_screen()
        .args(["build", "-i", "refs", "-o", "db_bloom", "--error-rate", "1.5"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("False-positive rate"));
}

#[test]
fn test_screen_with_taxids() {
    let dir = corpus();
    build(dir.path());

    kmer_screen()
        .args([
            "screen", "-i", "queries.fasta", "-d", "db_bloom", "-o", "out", "--taxid", "taxid.map",
        ])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Screened 3 sequences, 2 with hits"));

    let results = std::fs::read_to_string(dir.path().join("out/matching_results.csv"))
        .expect("Results should exist");
    let lines: Vec<&str> = results.lines().collect();
    assert!(lines[0].ends_with("Jacc,Qcov,TaxID"));
    assert!(lines.contains(&"q1,4,ref1,4,6,GCA_000123.1,1.0000,1.0000,10239"));
    // q2 k-mers TTT TTG TGG, ref2 k-mers TTT TTG TGG GGG
    assert!(lines.iter().any(|l| l.starts_with("q2,3,ref2,3,6,GCA_000777.1,") && l.ends_with(",N/A")));

    let filtered = std::fs::read_to_string(dir.path().join("out/filtered_results.csv"))
        .expect("Filtered results should exist");
    let lines: Vec<&str> = filtered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("q1,4,ref1,"));
}

#[test]
fn test_screen_missing_taxid_map_is_skipped() {
    let dir = corpus();
    build(dir.path());

    kmer_screen()
        .args([
            "screen", "-i", "queries.fasta", "-d", "db_bloom", "-o", "out", "--taxid", "absent.map",
        ])
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("TaxID map not found"));

    let results = std::fs::read_to_string(dir.path().join("out/matching_results.csv"))
        .expect("Results should exist");
    assert!(results.lines().next().is_some_and(|h| h.ends_with("Jacc,Qcov")));
}

#[test]
fn test_screen_uses_taxid_map_in_working_directory() {
    let dir = corpus();
    build(dir.path());

    kmer_screen()
        .args(["screen", "-i", "queries.fasta", "-d", "db_bloom", "-o", "out"])
        .current_dir(dir.path())
        .assert()
        .success();

    let results = std::fs::read_to_string(dir.path().join("out/matching_results.csv"))
        .expect("Results should exist");
    assert!(results.lines().next().is_some_and(|h| h.ends_with("Qcov,TaxID")));
    assert!(results.contains("GCA_000123.1,1.0000,1.0000,10239"));
}

#[test]
fn test_long_help_describes_query_coverage() {
    kmer_screen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "fraction of reference k-mers found in the query",
        ));
}

#[test]
fn test_screen_from_stdin() {
    let dir = corpus();
    build(dir.path());

    kmer_screen()
        .args(["screen", "-i", "-", "-d", "db_bloom", "-o", "out", "--format", "json"])
        .current_dir(dir.path())
        .write_stdin(">q1\nACGTACGT\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched_queries\": 1"));
}

#[test]
fn test_screen_missing_index_fails() {
    let dir = corpus();
    kmer_screen()
        .args(["screen", "-i", "queries.fasta", "-d", "nowhere", "-o", "out"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Index file not found"));
}

#[test]
fn test_inspect_json() {
    let dir = corpus();
    build(dir.path());

    kmer_screen()
        .args(["inspect", "-d", "db_bloom", "--format", "json"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kmer_size\": 3"))
        .stdout(predicate::str::contains("\"references\": 2"))
        .stdout(predicate::str::contains("\"format_version\": 1"));
}

#[test]
fn test_inspect_text() {
    let dir = corpus();
    build(dir.path());

    kmer_screen()
        .args(["inspect", "-d", "db_bloom/bloom_filter.bin"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("k-mer size:      3"));
}

//! Best-hit selection over a results table.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::report::table::{read_records, write_record};
use crate::report::{column_index, ReportError, JACCARD_COLUMN, NAME_COLUMN, QCOV_COLUMN};
use crate::utils::validation::validate_threshold;

/// Default minimum Jaccard score for a reported hit
pub const DEFAULT_MIN_JACCARD: f64 = 0.95;

/// Default minimum query coverage for a reported hit
pub const DEFAULT_MIN_QUERY_COVERAGE: f64 = 0.8;

/// Thresholds applied when selecting best hits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportConfig {
    pub min_jaccard: f64,
    pub min_query_coverage: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_jaccard: DEFAULT_MIN_JACCARD,
            min_query_coverage: DEFAULT_MIN_QUERY_COVERAGE,
        }
    }
}

impl ReportConfig {
    /// Check both thresholds lie in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Config` naming the offending threshold.
    pub fn validate(&self) -> Result<(), ReportError> {
        validate_threshold("jacc", self.min_jaccard)?;
        validate_threshold("qcov", self.min_query_coverage)?;
        Ok(())
    }
}

struct ScoredRow {
    fields: Vec<String>,
    jaccard: f64,
    query_coverage: f64,
}

fn parse_score(fields: &[String], index: usize, column: &str, line: usize) -> Result<f64, ReportError> {
    let value = fields.get(index).map_or("", String::as_str);
    value.trim().parse().map_err(|_| ReportError::InvalidNumber {
        column: column.to_string(),
        value: value.to_string(),
        line,
    })
}

/// Keep rows meeting both thresholds, then the single best row per sequence.
///
/// Rows are ordered by sequence name ascending, then Jaccard descending, then
/// query coverage descending. The sort is stable, so ties keep input order.
///
/// # Errors
///
/// Returns `ReportError::MissingColumn` if the header lacks a required column,
/// or `ReportError::InvalidNumber` if a score does not parse.
pub fn select_best_hits(
    header: &[String],
    rows: Vec<Vec<String>>,
    config: &ReportConfig,
) -> Result<Vec<Vec<String>>, ReportError> {
    let name_index = column_index(header, NAME_COLUMN)?;
    let jaccard_index = column_index(header, JACCARD_COLUMN)?;
    let qcov_index = column_index(header, QCOV_COLUMN)?;

    let mut kept = Vec::new();
    for (offset, fields) in rows.into_iter().enumerate() {
        // line numbers are 1-based and the header is line 1
        let line = offset + 2;
        let jaccard = parse_score(&fields, jaccard_index, JACCARD_COLUMN, line)?;
        let query_coverage = parse_score(&fields, qcov_index, QCOV_COLUMN, line)?;
        if jaccard >= config.min_jaccard && query_coverage >= config.min_query_coverage {
            kept.push(ScoredRow {
                fields,
                jaccard,
                query_coverage,
            });
        }
    }

    let name = |row: &ScoredRow| row.fields.get(name_index).cloned().unwrap_or_default();
    kept.sort_by(|a, b| {
        name(a)
            .cmp(&name(b))
            .then_with(|| b.jaccard.total_cmp(&a.jaccard))
            .then_with(|| b.query_coverage.total_cmp(&a.query_coverage))
    });
    kept.dedup_by(|later, earlier| name(later) == name(earlier));

    Ok(kept.into_iter().map(|row| row.fields).collect())
}

/// Read `input`, select best hits and write them to `output`.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns `ReportError::Empty` when `input` has no header, or any error from
/// [`select_best_hits`] or the underlying IO.
pub fn filter_best_hits(input: &Path, output: &Path, config: &ReportConfig) -> Result<usize, ReportError> {
    config.validate()?;

    let mut records = read_records(BufReader::new(File::open(input)?))?.into_iter();
    let header = records
        .next()
        .ok_or_else(|| ReportError::Empty(input.to_path_buf()))?;
    let best = select_best_hits(&header, records.collect(), config)?;

    let mut writer = BufWriter::new(File::create(output)?);
    write_record(&mut writer, &header)?;
    for row in &best {
        write_record(&mut writer, row)?;
    }
    writer.flush()?;

    info!("Wrote {} best hits to {}", best.len(), output.display());
    Ok(best.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        ["Sequence Name", "Reference", "Jacc", "Qcov"]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn row(name: &str, reference: &str, jaccard: &str, qcov: &str) -> Vec<String> {
        vec![
            name.to_string(),
            reference.to_string(),
            jaccard.to_string(),
            qcov.to_string(),
        ]
    }

    #[test]
    fn test_default_thresholds() {
        let config = ReportConfig::default();
        assert!((config.min_jaccard - 0.95).abs() < f64::EPSILON);
        assert!((config.min_query_coverage - 0.8).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        let config = ReportConfig {
            min_jaccard: 1.5,
            ..ReportConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReportError::Config(_))));
    }

    #[test]
    fn test_best_hit_per_sequence() {
        let rows = vec![
            row("q2", "refA", "0.9600", "0.9000"),
            row("q1", "refA", "0.9600", "0.8500"),
            row("q1", "refB", "0.9900", "0.8100"),
            row("q1", "refC", "0.9900", "0.9500"),
            row("q3", "refA", "0.5000", "1.0000"),
        ];
        let best = select_best_hits(&header(), rows, &ReportConfig::default()).unwrap();

        assert_eq!(best.len(), 2);
        assert_eq!(best[0], row("q1", "refC", "0.9900", "0.9500"));
        assert_eq!(best[1], row("q2", "refA", "0.9600", "0.9000"));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = vec![
            row("q1", "first", "1.0000", "1.0000"),
            row("q1", "second", "1.0000", "1.0000"),
        ];
        let best = select_best_hits(&header(), rows, &ReportConfig::default()).unwrap();
        assert_eq!(best, vec![row("q1", "first", "1.0000", "1.0000")]);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let rows = vec![row("q1", "refA", "0.95", "0.8")];
        let best = select_best_hits(&header(), rows, &ReportConfig::default()).unwrap();
        assert_eq!(best.len(), 1);
    }

    #[test]
    fn test_invalid_number() {
        let rows = vec![row("q1", "refA", "high", "0.9")];
        let result = select_best_hits(&header(), rows, &ReportConfig::default());
        assert!(matches!(
            result,
            Err(ReportError::InvalidNumber { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_column() {
        let header = vec!["Sequence Name".to_string(), "Jacc".to_string()];
        let result = select_best_hits(&header, Vec::new(), &ReportConfig::default());
        assert!(matches!(result, Err(ReportError::MissingColumn(ref c)) if c == "Qcov"));
    }

    #[test]
    fn test_filter_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("matching_results.csv");
        let output = dir.path().join("filtered_results.csv");
        std::fs::write(
            &input,
            "Sequence Name,Reference,Jacc,Qcov,TaxID\n\
             q1,refA,0.9700,0.9000,10239\n\
             q1,refB,0.9800,0.9000,N/A\n\
             q2,refA,0.1000,0.1000,10239\n",
        )
        .unwrap();

        let written = filter_best_hits(&input, &output, &ReportConfig::default()).unwrap();
        assert_eq!(written, 1);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "Sequence Name,Reference,Jacc,Qcov,TaxID\nq1,refB,0.9800,0.9000,N/A\n"
        );
    }

    #[test]
    fn test_filter_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.csv");
        std::fs::write(&input, "").unwrap();
        let result = filter_best_hits(&input, &dir.path().join("out.csv"), &ReportConfig::default());
        assert!(matches!(result, Err(ReportError::Empty(_))));
    }
}

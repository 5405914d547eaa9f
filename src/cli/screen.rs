use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::warn;

use crate::catalog::persist;
use crate::cli::OutputFormat;
use crate::matching::MatchEngine;
use crate::parsing::fasta::{self, FastaRecords};
use crate::report::filter::{DEFAULT_MIN_JACCARD, DEFAULT_MIN_QUERY_COVERAGE};
use crate::report::{
    append_taxid_column, filter_best_hits, load_taxid_map, ReportConfig, FILTERED_RESULTS_FILE,
    MATCH_RESULTS_FILE,
};

/// TaxID map looked up when `--taxid` is not given
pub const DEFAULT_TAXID_MAP: &str = "taxid.map";

#[derive(Args)]
pub struct ScreenArgs {
    /// Query FASTA file (optionally gzipped)
    /// Use '-' for stdin
    #[arg(short, long, required = true)]
    pub input: PathBuf,

    /// Index file, or the directory it was built into
    #[arg(short, long, required = true)]
    pub database: PathBuf,

    /// Directory the result tables are written into
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// Minimum Jaccard score of a reported best hit
    #[arg(long, default_value_t = DEFAULT_MIN_JACCARD)]
    pub jacc: f64,

    /// Minimum query coverage of a reported best hit
    #[arg(long, default_value_t = DEFAULT_MIN_QUERY_COVERAGE)]
    pub qcov: f64,

    /// Tab-separated accession to taxonomy id map
    /// The TaxID column is skipped with a warning when the file is absent
    #[arg(long, default_value = DEFAULT_TAXID_MAP)]
    pub taxid: PathBuf,
}

fn open_queries(input: &Path) -> anyhow::Result<Box<dyn BufRead + Send>> {
    if input.as_os_str() == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        Ok(fasta::open_reader(input)?)
    }
}

pub fn run(args: ScreenArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = ReportConfig {
        min_jaccard: args.jacc,
        min_query_coverage: args.qcov,
    };
    config.validate()?;

    let index = persist::load(&args.database)?;
    if verbose {
        eprintln!(
            "Loaded index with {} references (k={})",
            index.catalog().len(),
            index.kmer_size()
        );
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let results = args.output.join(MATCH_RESULTS_FILE);
    let filtered = args.output.join(FILTERED_RESULTS_FILE);

    let records = FastaRecords::new(open_queries(&args.input)?);
    let mut writer = BufWriter::new(
        File::create(&results).with_context(|| format!("Failed to create {}", results.display()))?,
    );
    let summary = MatchEngine::new(&index).match_records(records, &mut writer)?;
    drop(writer);

    let taxid_added = args.taxid.is_file();
    if taxid_added {
        let taxids = load_taxid_map(&args.taxid)?;
        append_taxid_column(&results, &taxids)?;
    } else {
        warn!(
            "TaxID map not found at {}, skipping TaxID column",
            args.taxid.display()
        );
    }

    let best_hits = filter_best_hits(&results, &filtered, &config)?;

    match format {
        OutputFormat::Text => {
            println!(
                "Screened {} sequences, {} with hits ({} rows)",
                summary.queries, summary.matched_queries, summary.rows
            );
            println!("  Results:   {}", results.display());
            println!("  Best hits: {} ({})", filtered.display(), best_hits);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "queries": summary.queries,
                "matched_queries": summary.matched_queries,
                "rows": summary.rows,
                "best_hits": best_hits,
                "taxid_added": taxid_added,
                "results": results.display().to_string(),
                "filtered": filtered.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

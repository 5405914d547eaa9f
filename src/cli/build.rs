use std::path::PathBuf;
use std::time::Instant;

use clap::Args;

use crate::catalog::bloom::DEFAULT_ERROR_RATE;
use crate::catalog::builder::{IndexBuilder, IndexConfig, DEFAULT_CAPACITY_FACTOR, DEFAULT_THREADS};
use crate::catalog::estimate::EstimateScope;
use crate::catalog::persist;
use crate::cli::OutputFormat;
use crate::core::kmer::DEFAULT_KMER_SIZE;

#[derive(Args)]
pub struct BuildArgs {
    /// Directory of reference files (.fna, .fasta, optionally gzipped)
    #[arg(short, long, required = true)]
    pub input: PathBuf,

    /// Directory the index is written into
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// k-mer length
    #[arg(short, long, default_value_t = DEFAULT_KMER_SIZE)]
    pub kmer_size: usize,

    /// Target false-positive rate of the Bloom filter
    #[arg(short, long, default_value_t = DEFAULT_ERROR_RATE)]
    pub error_rate: f64,

    /// Size the filter for this many times the estimated k-mer count
    #[arg(long, default_value_t = DEFAULT_CAPACITY_FACTOR)]
    pub factor: u64,

    /// Number of ingestion worker threads
    #[arg(short, long, default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// Include .fasta and .fasta.gz files in the capacity estimate
    /// (by default only .fna and .fna.gz are counted)
    #[arg(long)]
    pub estimate_all_formats: bool,
}

impl BuildArgs {
    fn config(&self) -> IndexConfig {
        IndexConfig {
            kmer_size: self.kmer_size,
            factor: self.factor,
            error_rate: self.error_rate,
            threads: self.threads,
            estimate_scope: if self.estimate_all_formats {
                EstimateScope::AllReferenceFormats
            } else {
                EstimateScope::FnaOnly
            },
        }
    }
}

pub fn run(args: BuildArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let start = Instant::now();
    let builder = IndexBuilder::new(args.config())?;

    if verbose {
        eprintln!(
            "Building index from {} (k={}, error rate {}, factor {}, {} threads)",
            args.input.display(),
            args.kmer_size,
            args.error_rate,
            args.factor,
            args.threads
        );
    }

    let index = builder.build(&args.input)?;
    let path = persist::save(&index, &args.output)?;
    let summary = index.summary();
    let elapsed = start.elapsed().as_secs_f64();

    match format {
        OutputFormat::Text => {
            println!("Index written to {}", path.display());
            println!("  References:     {}", summary.references);
            println!("  Distinct k-mers: {}", summary.distinct_kmers);
            println!(
                "  Filter:         {} bits, {} hashes, capacity {}",
                summary.num_bits, summary.num_hashes, summary.capacity
            );
            println!("  Elapsed:        {elapsed:.2}s");
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path.display().to_string(),
                "elapsed_seconds": elapsed,
                "index": summary,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

//! Command-line interface for kmer-screen.
//!
//! Available commands:
//!
//! - **build**: Build a k-mer index from a directory of reference FASTA files
//! - **screen**: Match query sequences against an index and report best hits
//! - **inspect**: Show the parameters of a saved index
//!
//! ## Usage
//!
//! ```text
//! # Build an index over a reference directory
//! kmer-screen build -i references/ -o db_bloom
//!
//! # Screen contigs against it, tagging hits with taxonomy ids
//! kmer-screen screen -i contigs.fasta -d db_bloom -o results --taxid taxid.map
//!
//! # Pipe queries from stdin
//! zcat contigs.fasta.gz | kmer-screen screen -i - -d db_bloom -o results
//!
//! # JSON output for scripting
//! kmer-screen inspect -d db_bloom --format json
//! ```

use clap::{Parser, Subcommand};

pub mod build;
pub mod inspect;
pub mod screen;

#[derive(Parser)]
#[command(name = "kmer-screen")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Screen sequences against a k-mer Bloom filter index of reference genomes")]
#[command(
    long_about = "kmer-screen indexes every k-mer of a reference genome collection in a Bloom filter backed by an exact reverse index.\n\nQuery sequences are then scored against each reference they share k-mers with:\n- Jaccard similarity of the query and reference k-mer sets\n- Query coverage, the fraction of reference k-mers found in the query\n- The best hit per query above both thresholds"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an index from a directory of reference files
    Build(build::BuildArgs),

    /// Screen query sequences against an index
    Screen(screen::ScreenArgs),

    /// Show index parameters
    Inspect(inspect::InspectArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

use std::path::PathBuf;

use clap::Args;

use crate::catalog::persist;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct InspectArgs {
    /// Index file, or the directory it was built into
    #[arg(short, long, required = true)]
    pub database: PathBuf,
}

pub fn run(args: InspectArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let header = persist::read_header(&args.database)?;
    let index = persist::load(&args.database)?;
    let summary = index.summary();

    match format {
        OutputFormat::Text => {
            println!("Format version:  {}", header.format_version);
            println!("Created:         {}", summary.created_at);
            println!("k-mer size:      {}", summary.kmer_size);
            println!("References:      {}", summary.references);
            println!("Distinct k-mers: {}", summary.distinct_kmers);
            println!("Capacity:        {}", summary.capacity);
            println!("Error rate:      {}", summary.error_rate);
            println!("Bits:            {}", summary.num_bits);
            println!("Hashes:          {}", summary.num_hashes);
            println!(
                "Set bits:        {} ({:.2}%)",
                summary.set_bits,
                summary.fill_ratio() * 100.0
            );
        }
        OutputFormat::Json => {
            let mut output = serde_json::to_value(&summary)?;
            output["format_version"] = serde_json::json!(header.format_version);
            output["fill_ratio"] = serde_json::json!(summary.fill_ratio());
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

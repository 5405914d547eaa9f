use clap::Parser;
use tracing_subscriber::EnvFilter;

use kmer_screen::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Progress is logged at info; --verbose adds per-row match detail
    let filter = if cli.verbose {
        EnvFilter::new("kmer_screen=debug,info")
    } else {
        EnvFilter::new("kmer_screen=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Build(args) => {
            cli::build::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Screen(args) => {
            cli::screen::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Inspect(args) => {
            cli::inspect::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}

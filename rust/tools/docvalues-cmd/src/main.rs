use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "docvalues-cmd")]
#[command(about = "Command-line utility for doc values segments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode the fields described by a JSON document into a new segment
    Ingest {
        /// Path to the JSON document with the segment name, max doc and fields
        #[arg(short, long)]
        input: String,

        /// Path to a JSON file with encoder settings
        #[arg(long)]
        config: Option<String>,

        /// Output directory
        dir: String,
    },

    /// Open a segment, verify it and summarize its fields
    Inspect {
        /// Increase verbosity (-v prints the values, -vv also enables debug logging)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Directory holding the segment
        dir: String,

        /// Segment name
        segment: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Inspect { verbose, .. } => *verbose,
        Commands::Ingest { .. } => 0,
    };
    if verbose > 1 {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    match cli.command {
        Commands::Ingest { input, config, dir } => commands::ingest::run(input, config, dir),
        Commands::Inspect {
            verbose,
            dir,
            segment,
        } => commands::inspect::run(verbose, dir, segment),
    }
}

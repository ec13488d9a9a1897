//! Command-line interface for fixture-forge
//!
//! # Usage Examples
//!
//! ```bash
//! # One order with a random seed (logged at debug level)
//! RUST_LOG=fixture_populate=debug fixture-forge generate --schema shop.yaml --type Order
//!
//! # Reproducible batch written to a file
//! fixture-forge generate --schema shop.yaml --type "List<Order>" \
//!   --seed 7 --count 100 --output orders.jsonl
//! ```

use clap::{Parser, Subcommand};
use fixture_forge::{generate, GenerateArgs};

#[derive(Parser)]
#[command(name = "fixture-forge")]
#[command(about = "Generate populated object graphs from a type schema")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate values of a type and print them as JSON lines
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { args } => generate::run_generate(&args),
    }
}

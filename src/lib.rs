//! fixture-forge library
//!
//! Command handlers behind the `fixture-forge` binary. The generation engine
//! itself lives in the workspace crates:
//!
//! - `fixture_core` - type expressions, schemas, settings and values
//! - `fixture_populate` - node trees, generators and the population driver
//!
//! # CLI Usage
//!
//! ```bash
//! # Three orders as JSON lines
//! fixture-forge generate --schema shop.yaml --type Order --count 3 --seed 42
//!
//! # A generic type with custom settings, pretty-printed to a file
//! fixture-forge generate --schema shop.yaml --type "Page<Order>" \
//!   --settings settings.yaml --pretty --output page.json
//! ```

use clap::Parser;
use std::path::PathBuf;

pub mod generate;

#[derive(Parser, Clone, Debug)]
pub struct GenerateArgs {
    /// Type schema (YAML)
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,

    /// Type expression to generate, such as "Order" or "Pair<String, Integer>"
    #[arg(long = "type", value_name = "TYPE")]
    pub type_expr: String,

    /// Generation settings (YAML); defaults apply when omitted
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Seed for reproducible output, overriding the settings file
    #[arg(long, env = "FIXTURE_FORGE_SEED")]
    pub seed: Option<u64>,

    /// Number of values to generate
    #[arg(long, default_value = "1")]
    pub count: usize,

    /// Pretty-print each JSON document
    #[arg(long)]
    pub pretty: bool,

    /// Write to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

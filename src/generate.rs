//! Generate command handler.

use crate::GenerateArgs;
use anyhow::Context;
use fixture_core::{Settings, TypeRef, TypeSchema};
use fixture_populate::Fixture;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

/// Run the generate command.
pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    info!("Generating {} value(s) of {}", args.count, args.type_expr);

    let fixture = build_fixture(args)?;

    let written = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {path:?}"))?;
            write_values(&fixture, args.count, args.pretty, BufWriter::new(file))?
        }
        None => write_values(&fixture, args.count, args.pretty, std::io::stdout().lock())?,
    };

    info!("Wrote {written} value(s)");
    Ok(())
}

/// Load the schema and settings named by `args` and build the fixture.
pub fn build_fixture(args: &GenerateArgs) -> anyhow::Result<Fixture> {
    let schema = TypeSchema::from_file(&args.schema)
        .with_context(|| format!("Failed to load schema file: {:?}", args.schema))?;

    let settings = match &args.settings {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings file: {path:?}"))?,
        None => Settings::default(),
    };

    let target = TypeRef::parse(&args.type_expr)
        .with_context(|| format!("Invalid type expression: {}", args.type_expr))?;

    let mut builder = Fixture::builder(schema, target).settings(settings);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    builder
        .build()
        .with_context(|| format!("Failed to prepare generation of {}", args.type_expr))
}

/// Write `count` values as JSON documents, one per line.
pub fn write_values<W: Write>(
    fixture: &Fixture,
    count: usize,
    pretty: bool,
    mut out: W,
) -> anyhow::Result<usize> {
    let mut written = 0;
    for (index, value) in fixture.iter(count).enumerate() {
        let value = value.with_context(|| format!("Failed to generate value {index}"))?;
        let json = value.to_json();
        if pretty {
            serde_json::to_writer_pretty(&mut out, &json)?;
        } else {
            serde_json::to_writer(&mut out, &json)?;
        }
        writeln!(out)?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

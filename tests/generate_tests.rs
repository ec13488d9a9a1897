use clap::Parser;
use fixture_forge::generate::{build_fixture, run_generate, write_values};
use fixture_forge::GenerateArgs;
use std::io::Write;
use tempfile::NamedTempFile;

const SCHEMA: &str = r#"
types:
  - name: Order
    fields:
      - { name: id, type: Uuid }
      - { name: quantity, type: int }
      - { name: lines, type: "List<Line>" }
  - name: Line
    fields:
      - { name: sku, type: String }
      - { name: price, type: Decimal }
"#;

fn schema_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SCHEMA.as_bytes()).unwrap();
    file
}

fn args(schema: &NamedTempFile, extra: &[&str]) -> GenerateArgs {
    let schema = schema.path().to_str().unwrap();
    let mut argv = vec!["generate", "--schema", schema, "--type", "Order"];
    argv.extend_from_slice(extra);
    GenerateArgs::try_parse_from(argv).unwrap()
}

#[test]
fn test_args_defaults() {
    let schema = schema_file();
    let args = args(&schema, &[]);
    assert_eq!(args.type_expr, "Order");
    assert_eq!(args.count, 1);
    assert!(!args.pretty);
    assert!(args.settings.is_none());
    assert!(args.output.is_none());
}

#[test]
fn test_writes_one_document_per_line() {
    let schema = schema_file();
    let args = args(&schema, &["--seed", "42", "--count", "3"]);
    let fixture = build_fixture(&args).unwrap();

    let mut out = Vec::new();
    let written = write_values(&fixture, args.count, args.pretty, &mut out).unwrap();
    assert_eq!(written, 3);

    let text = String::from_utf8(out).unwrap();
    let documents: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(documents.len(), 3);
    for order in &documents {
        assert!(order["id"].is_string());
        assert!(order["quantity"].as_i64().unwrap() >= 1);
        for line in order["lines"].as_array().unwrap() {
            assert!(line["sku"].is_string());
            assert!(line["price"].as_str().unwrap().contains('.'));
        }
    }
}

#[test]
fn test_output_file_is_reproducible() {
    let schema = schema_file();
    let first = NamedTempFile::new().unwrap();
    let second = NamedTempFile::new().unwrap();

    for output in [&first, &second] {
        let path = output.path().to_str().unwrap();
        run_generate(&args(&schema, &["--seed", "7", "--count", "2", "--output", path])).unwrap();
    }

    let first = std::fs::read_to_string(first.path()).unwrap();
    let second = std::fs::read_to_string(second.path()).unwrap();
    assert_eq!(first.lines().count(), 2);
    assert_eq!(first, second);
}

#[test]
fn test_settings_file_is_applied() {
    let schema = schema_file();
    let mut settings = NamedTempFile::new().unwrap();
    settings
        .write_all(b"collection_min_size: 4\ncollection_max_size: 4\n")
        .unwrap();

    let args = args(
        &schema,
        &["--seed", "1", "--settings", settings.path().to_str().unwrap()],
    );
    let fixture = build_fixture(&args).unwrap();
    let order = fixture.create().unwrap().to_json();
    assert_eq!(order["lines"].as_array().unwrap().len(), 4);
}

#[test]
fn test_unknown_type_is_reported() {
    let schema = schema_file();
    let mut argv_args = args(&schema, &[]);
    argv_args.type_expr = "Invoice".to_string();

    let err = build_fixture(&argv_args).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Failed to prepare generation of Invoice"), "{message}");
    assert!(message.contains("Unknown type 'Invoice'"), "{message}");
}

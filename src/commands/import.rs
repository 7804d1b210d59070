//! Import command implementation.
//!
//! The import command:
//! 1. Reads the trace text file
//! 2. Tokenizes it into trace lines
//! 3. Correlates disk events into slices
//! 4. Writes the JSON report

use super::models::ImportArgs;
use crate::importer::{DiskImporter, ImportStats};
use crate::model::TraceModel;
use crate::output::write_report;
use crate::parser::LineTokenizer;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the import command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable input file
/// * A line that is not an ftrace record
/// * File write errors
/// * Any import warning when `strict` is set
pub fn execute_import(args: ImportArgs) -> Result<ImportStats> {
    let start_time = Instant::now();

    info!("Importing disk events from: {}", args.input.display());

    info!("Step 1/3: Reading trace...");
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read trace file {}", args.input.display()))?;

    info!("Step 2/3: Correlating disk events...");
    let tokenizer = LineTokenizer::new().context("Failed to build line tokenizer")?;
    let lines = tokenizer
        .tokenize_all(&text)
        .context("Failed to tokenize trace")?;
    debug!("Tokenized {} lines", lines.len());

    let importer = DiskImporter::new().context("Failed to build disk importer")?;
    let mut model = TraceModel::new();
    let stats = importer.import(&lines, &mut model);

    info!("Step 3/3: Writing report...");
    let report = model.to_report(&args.input.display().to_string());
    write_report(&report, &args.output_json).context("Failed to write report JSON")?;

    info!("✓ Report written to: {}", args.output_json.display());

    if args.print_summary {
        print_summary(&model, &stats);
    }

    let elapsed = start_time.elapsed();
    info!("Import completed in {:.2}s", elapsed.as_secs_f64());

    if args.strict && model.has_import_warnings() {
        anyhow::bail!(
            "Import produced {} warnings",
            model.import_warnings().len()
        );
    }

    Ok(stats)
}

/// Validate import arguments
///
/// **Public** - can be called before execute_import for early validation
pub fn validate_args(args: &ImportArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input trace path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input trace not found: {}", args.input.display());
    }

    if args.output_json == args.input {
        anyhow::bail!("Output path must differ from the input trace");
    }

    Ok(())
}

fn print_summary(model: &TraceModel, stats: &ImportStats) {
    println!("\n{}", "=".repeat(80));
    println!("DISK IMPORT SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Lines:        {}", stats.lines);
    println!("Disk events:  {}", stats.recognized);
    println!("Slices:       {}", stats.slices);
    println!("Still open:   {}", stats.unclosed);
    println!("Warnings:     {}", stats.warnings);
    println!();

    for thread in model.threads() {
        let busy: f64 = thread.slices.iter().map(|s| s.duration).sum();
        println!(
            "  {:<40} {:>6} slices {:>12.3} ms",
            thread.name,
            thread.slices.len(),
            busy * 1000.0
        );
    }

    for warning in model.import_warnings().iter().take(10) {
        println!("  ! {}", warning);
    }
    println!("{}", "=".repeat(80));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_args_empty_input() {
        let args = ImportArgs::default();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_missing_input() {
        let args = ImportArgs {
            input: "/definitely/not/here.txt".into(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_execute_import_writes_report() {
        let mut trace = NamedTempFile::new().unwrap();
        writeln!(trace, "# tracer: nop").unwrap();
        writeln!(
            trace,
            "mmcqd/0-81    [000] d..2 154578.668390: block_rq_issue: 179,0 WS 0 () 3427120 + 16 [mmcqd/0]"
        )
        .unwrap();
        writeln!(
            trace,
            "mmcqd/0-81    [000] d..2 154578.669181: block_rq_complete: 179,0 WS () 3427120 + 16 [0]"
        )
        .unwrap();

        let out_dir = tempfile::tempdir().unwrap();
        let args = ImportArgs {
            input: trace.path().to_path_buf(),
            output_json: out_dir.path().join("report.json"),
            ..Default::default()
        };

        assert!(validate_args(&args).is_ok());
        let stats = execute_import(args.clone()).unwrap();
        assert_eq!(stats.slices, 1);

        let report = crate::output::read_report(&args.output_json).unwrap();
        assert_eq!(report.threads[0].name, "block:mmcqd/0");
        assert!(!report.had_warnings);
    }

    #[test]
    fn test_strict_fails_on_warnings() {
        let mut trace = NamedTempFile::new().unwrap();
        writeln!(
            trace,
            "mmcqd/0-81    [000] d..2 154578.669181: block_rq_complete: 179,0 WS () 3427120 + 16 [0]"
        )
        .unwrap();

        let out_dir = tempfile::tempdir().unwrap();
        let args = ImportArgs {
            input: trace.path().to_path_buf(),
            output_json: out_dir.path().join("report.json"),
            strict: true,
            ..Default::default()
        };

        assert!(execute_import(args).is_err());
    }
}

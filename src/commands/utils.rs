use crate::output::read_report;
use crate::parser::DispatchTable;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Source: {}", report.source);
    println!("  Threads: {}", report.threads.len());
    println!("  Slices: {}", report.slice_count());
    println!("  Warnings: {}", report.warnings.len());

    Ok(())
}

/// List the tracepoints the importer understands
pub fn display_events() {
    let table = DispatchTable::new();
    println!("Recognized disk tracepoints:");
    for name in table.event_names() {
        println!("  {}", name);
    }
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Disk Trace Studio Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  source: string           - Trace file that was imported");
        println!("  had_warnings: bool       - True if any line produced a warning");
        println!("  warnings: array          - Warning messages in input order");
        println!("  threads: array           - Synthesized async threads");
        println!("    name: string           - e.g. 'block:mmcqd/0', 'ext4:AsyncTask #2'");
        println!("    slices: array          - Completed disk operations");
        println!("      category: string     - ext4 | f2fs | block");
        println!("      title: string        - e.g. 'fsync', 'write sync'");
        println!("      start: number        - Seconds since boot");
        println!("      duration: number     - Seconds");
        println!("      args: object         - device, inode, error, sector, numSectors");
        println!("        <name>: object     - {{type: bool|uint|int|str, value}}");
        println!("  generated_at: string     - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Disk Trace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Correlates Linux disk I/O tracepoints into per-thread async slices.");
}

use std::path::PathBuf;

/// Arguments for the import command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ImportArgs {
    /// ftrace text file to import
    pub input: PathBuf,

    /// Output path for the JSON report
    pub output_json: PathBuf,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Exit with an error when any line produced a warning
    pub strict: bool,
}

impl Default for ImportArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_json: PathBuf::from("disk-slices.json"),
            print_summary: false,
            strict: false,
        }
    }
}

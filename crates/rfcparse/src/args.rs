//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

const AFTER_HELP: &str = r#"Examples: rfcparse -f "C:\Temp\RecentFileCache.bcf" --csv "c:\temp"
          rfcparse -f "C:\Temp\RecentFileCache.bcf" --json "D:\jsonOutput" --pretty

          Short options (single letter) are prefixed with a single dash. Long commands are prefixed with two dashes"#;

/// Parse a Windows RecentFileCache.bcf and export its recorded program paths.
#[derive(Parser, Debug)]
#[command(name = "rfcparse", version, after_help = AFTER_HELP)]
pub struct Args {
    /// File to process
    #[arg(short = 'f', value_name = "FILE")]
    pub file: PathBuf,

    /// Directory to save CSV formatted results to
    #[arg(long, value_name = "DIR")]
    pub csv: Option<PathBuf>,

    /// File name to save CSV formatted results to. When present, overrides default name
    #[arg(long, value_name = "NAME", requires = "csv")]
    pub csvf: Option<String>,

    /// Directory to save json representation to. Use --pretty for a more human readable layout
    #[arg(long, value_name = "DIR")]
    pub json: Option<PathBuf>,

    /// When exporting to json, use a more human readable layout
    #[arg(long)]
    pub pretty: bool,

    /// Only show the filename being processed vs all output
    #[arg(short = 'q')]
    pub quiet: bool,

    /// Show debug information during processing
    #[arg(long)]
    pub debug: bool,

    /// Show trace information during processing
    #[arg(long, conflicts_with = "debug")]
    pub trace: bool,
}

impl Args {
    /// Log filter directive implied by `--debug` / `--trace`, if any.
    pub fn level_override(&self) -> Option<&'static str> {
        if self.trace {
            Some("trace")
        } else if self.debug {
            Some("debug")
        } else {
            None
        }
    }
}

//! rfcparse: RecentFileCache.bcf parser.
//!
//! Decodes a `RecentFileCache.bcf`, prints the recorded program paths with the
//! source file's timestamps, and optionally exports them to CSV and/or JSON.

mod args;
mod export;
mod report;

use args::Args;
use clap::Parser;
use recentfilecache::RfcError;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    if !args.file.exists() {
        warn!("File {} not found. Exiting", args.file.display());
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<RfcError>() {
                Some(RfcError::IoFailure { source, .. })
                    if source.kind() == std::io::ErrorKind::PermissionDenied =>
                {
                    error!(
                        "Unable to access {}. Are you running as an administrator? Error: {:#}",
                        args.file.display(),
                        e
                    );
                }
                _ => error!("Error processing file {}. Error: {:#}", args.file.display(), e),
            }
            ExitCode::FAILURE
        }
    }
}

/// Console logging. `--debug`/`--trace` win over `RUST_LOG`, which wins over `info`.
fn init_tracing(args: &Args) {
    let filter = match args.level_override() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    if args.level_override().is_some() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        // Plain report layout: message text only.
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .without_time()
            .with_level(false)
            .with_target(false)
            .init();
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    if !args.file.exists() {
        anyhow::bail!("{} not found", args.file.display());
    }

    info!("rfcparse version {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Command line: {}",
        std::env::args().skip(1).collect::<Vec<_>>().join(" ")
    );
    info!("");

    if !args.quiet {
        info!("Processing {}", args.file.display());
        info!("");
    }

    let start = Instant::now();
    let cache = recentfilecache::load_file(&args.file)?;

    if !args.quiet {
        report::print_report(&cache);
        info!("");
    }

    info!(
        "---------- Processed {} in {:.8} seconds ----------",
        cache.source_file(),
        start.elapsed().as_secs_f64()
    );
    info!("{}", cache);

    // Export failures are reported but do not fail the run.
    if let Some(dir) = &args.csv {
        if let Err(e) = export::write_csv(&cache, dir, args.csvf.as_deref()) {
            error!("Error exporting CSV to {}. Error: {:#}", dir.display(), e);
        }
    }
    if let Some(dir) = &args.json {
        if let Err(e) = export::write_json(&cache, dir, args.pretty) {
            error!(
                "Error exporting json for {}. Error: {:#}",
                cache.source_file(),
                e
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> String {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../recentfilecache/tests/fixtures")
            .join(name)
            .display()
            .to_string()
    }

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(["rfcparse"].iter().chain(extra).copied()).unwrap()
    }

    #[test]
    fn test_run_missing_file() {
        assert!(run(&args(&["-f", "/nonexistent/RecentFileCache.bcf"])).is_err());
    }

    #[test]
    fn test_run_not_a_cache() {
        let err = run(&args(&["-f", &fixture("NotARecentFileCache.bcf")])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RfcError>(),
            Some(RfcError::InvalidSignature)
        ));
    }

    #[test]
    fn test_run_export_failure_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let json_dir = blocker.join("sub").display().to_string();
        let csv_dir = blocker.join("csv").display().to_string();

        let file = fixture("RecentFileCache.bcf");
        let result = run(&args(&["-f", &file, "--json", &json_dir, "--csv", &csv_dir, "-q"]));
        assert!(result.is_ok());
        assert!(!blocker.join("sub").exists());
    }

    #[test]
    fn test_run_writes_exports() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().display().to_string();
        let file = fixture("RecentFileCache 2.bcf");

        run(&args(&["-f", &file, "--csv", &out, "--csvf", "rfc.csv", "--json", &out])).unwrap();

        let csv_text = std::fs::read_to_string(tmp.path().join("rfc.csv")).unwrap();
        assert_eq!(csv_text.lines().count(), 3);
        assert!(csv_text.contains(r"c:\windows\system32\tasklist.exe"));
        let json_files = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(".json")
            })
            .count();
        assert_eq!(json_files, 1);
    }
}

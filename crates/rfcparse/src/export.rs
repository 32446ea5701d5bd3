//! CSV and JSON exporters for decoded caches.

use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use recentfilecache::DecodedCache;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Timestamp layout used in the console report and CSV output.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CSV_HEADER: [&str; 5] = [
    "SourceFile",
    "SourceCreated",
    "SourceModified",
    "SourceAccessed",
    "Filename",
];

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(DATE_TIME_FORMAT).to_string()
}

/// One CSV row per recorded path.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CsvRow<'a> {
    source_file: &'a str,
    source_created: String,
    source_modified: String,
    source_accessed: String,
    filename: &'a str,
}

/// Create `dir` (and parents) if it does not exist yet.
fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    if !dir.exists() {
        info!("{} does not exist. Creating...", dir.display());
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    Ok(())
}

/// Default CSV name: `{local yyyyMMddHHmmss}_RecentFileCacheParser_Output.csv`.
fn default_csv_name() -> String {
    format!(
        "{}_RecentFileCacheParser_Output.csv",
        Local::now().format("%Y%m%d%H%M%S")
    )
}

/// Write `cache` as CSV into `dir`, returning the path written.
///
/// Only the file-name component of `file_name` is used.
pub fn write_csv(cache: &DecodedCache, dir: &Path, file_name: Option<&str>) -> anyhow::Result<PathBuf> {
    ensure_dir(dir)?;

    let name = file_name
        .and_then(|f| Path::new(f).file_name())
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(default_csv_name);
    let out_file = dir.join(name);
    info!("CSV output will be saved to {}", out_file.display());

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&out_file)
        .with_context(|| format!("Unable to open {} for writing", out_file.display()))?;

    writer.write_record(CSV_HEADER)?;

    let created = format_timestamp(cache.source_created());
    let modified = format_timestamp(cache.source_modified());
    let accessed = format_timestamp(cache.source_accessed());
    for entry in cache.file_names() {
        writer.serialize(CsvRow {
            source_file: cache.source_file(),
            source_created: created.clone(),
            source_modified: modified.clone(),
            source_accessed: accessed.clone(),
            filename: entry,
        })?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", out_file.display()))?;

    Ok(out_file)
}

/// Write `cache` as JSON into `dir` as `{utc yyyyMMddHHmmss}_{source name}.json`.
pub fn write_json(cache: &DecodedCache, dir: &Path, pretty: bool) -> anyhow::Result<PathBuf> {
    ensure_dir(dir)?;
    info!("Saving json output to {}", dir.display());

    // Source paths may use either separator regardless of the host platform.
    let source_name = cache
        .source_file()
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("RecentFileCache.bcf");
    let out_file = dir.join(format!(
        "{}_{}.json",
        Utc::now().format("%Y%m%d%H%M%S"),
        source_name
    ));

    let json = if pretty {
        serde_json::to_string_pretty(cache)?
    } else {
        serde_json::to_string(cache)?
    };
    fs::write(&out_file, json).with_context(|| format!("writing {}", out_file.display()))?;

    Ok(out_file)
}

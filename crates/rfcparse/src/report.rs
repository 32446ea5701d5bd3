//! Console report for a decoded cache.

use crate::export::format_timestamp;
use recentfilecache::DecodedCache;
use tracing::info;

/// Lines of the full report, in display order.
pub fn report_lines(cache: &DecodedCache) -> Vec<String> {
    let mut lines = vec![
        format!("Source file: {}", cache.source_file()),
        format!("  Source created:  {}", format_timestamp(cache.source_created())),
        format!("  Source modified: {}", format_timestamp(cache.source_modified())),
        format!("  Source accessed: {}", format_timestamp(cache.source_accessed())),
        String::new(),
        "File names".to_string(),
    ];
    lines.extend(cache.file_names().iter().cloned());
    lines
}

pub fn print_report(cache: &DecodedCache) {
    for line in report_lines(cache) {
        info!("{}", line);
    }
}

//! Type definitions for decoded RecentFileCache data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filesystem timestamps of the source file, passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub accessed: DateTime<Utc>,
}

impl Provenance {
    pub fn new(created: DateTime<Utc>, modified: DateTime<Utc>, accessed: DateTime<Utc>) -> Self {
        Provenance {
            created,
            modified,
            accessed,
        }
    }
}

/// A fully decoded `RecentFileCache.bcf`.
///
/// `file_names` keeps the on-disk order of the records; nothing is sorted,
/// deduplicated or case-folded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DecodedCache {
    source_file: String,
    source_created: DateTime<Utc>,
    source_modified: DateTime<Utc>,
    source_accessed: DateTime<Utc>,
    file_names: Vec<String>,
}

impl DecodedCache {
    pub(crate) fn new(source_file: String, provenance: Provenance, file_names: Vec<String>) -> Self {
        DecodedCache {
            source_file,
            source_created: provenance.created,
            source_modified: provenance.modified,
            source_accessed: provenance.accessed,
            file_names,
        }
    }

    /// Path of the decoded file, as supplied by the caller.
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn source_created(&self) -> DateTime<Utc> {
        self.source_created
    }

    pub fn source_modified(&self) -> DateTime<Utc> {
        self.source_modified
    }

    pub fn source_accessed(&self) -> DateTime<Utc> {
        self.source_accessed
    }

    pub fn provenance(&self) -> Provenance {
        Provenance::new(self.source_created, self.source_modified, self.source_accessed)
    }

    /// Recorded paths in order of appearance.
    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }
}

impl fmt::Display for DecodedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileNames found: {}", group_thousands(self.file_names.len()))
    }
}

/// Format a count with `,` thousands separators.
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

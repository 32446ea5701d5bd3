//! Load a cache from disk: read bytes and filesystem timestamps, then decode.

use crate::error::{RfcError, RfcResult};
use crate::parser::{check_signature, decode};
use crate::types::{DecodedCache, Provenance};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read and decode a `RecentFileCache.bcf` file.
///
/// The stored source path is absolute. When the platform cannot report a
/// creation time, the modification time stands in for it.
pub fn load_file(path: impl AsRef<Path>) -> RfcResult<DecodedCache> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let raw = fs::read(path).map_err(|e| RfcError::io_failure(&shown, e))?;
    check_signature(&raw)?;

    let provenance = read_provenance(path)?;
    let source_file = std::path::absolute(path)
        .map_err(|e| RfcError::io_failure(&shown, e))?
        .display()
        .to_string();

    debug!("rfc: loaded {} ({} bytes)", source_file, raw.len());
    decode(&raw, source_file, provenance)
}

/// Filesystem created/modified/accessed times for `path`, in UTC.
fn read_provenance(path: &Path) -> RfcResult<Provenance> {
    let shown = path.display().to_string();
    let meta = fs::metadata(path).map_err(|e| RfcError::io_failure(&shown, e))?;

    let modified: DateTime<Utc> = meta
        .modified()
        .map_err(|e| RfcError::io_failure(&shown, e))?
        .into();
    let accessed: DateTime<Utc> = meta
        .accessed()
        .map_err(|e| RfcError::io_failure(&shown, e))?
        .into();
    let created: DateTime<Utc> = match meta.created() {
        Ok(t) => t.into(),
        Err(e) => {
            debug!("rfc: creation time unavailable for {}: {}", shown, e);
            modified
        }
    };

    Ok(Provenance::new(created, modified, accessed))
}

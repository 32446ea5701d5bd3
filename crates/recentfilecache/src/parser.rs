//! RecentFileCache decoder — signature check, header check and record walk.
//!
//! On-disk format:
//! ```text
//! +0x00  Magic (u32 LE) = 0xFFEEFFFE   (first byte 0xFE doubles as the quick signature)
//! +0x04  Reserved (16 bytes, not interpreted)
//! +0x14  Records, repeated until end of file:
//!          CharCount (i32 LE)
//!          Path      (CharCount UTF-16LE code units)
//!          Terminator (one UTF-16 code unit, normally 0)
//! ```
//!
//! The terminator is skipped without being checked. Real caches have been
//! observed to decode correctly under that rule, so a non-zero terminator is
//! tolerated rather than reported.

use crate::error::{RfcError, RfcResult};
use crate::types::{DecodedCache, Provenance};
use tracing::{debug, trace};

// ── Constants ────────────────────────────────────────────────────────

/// Quick signature: first byte of every cache.
pub const SIGNATURE_BYTE: u8 = 0xFE;
/// Magic at offset 0, little-endian.
pub const HEADER_MAGIC: u32 = 0xFFEE_FFFE;
/// Offset of the first record (end of the reserved header region).
pub const RECORDS_OFFSET: usize = 0x14;

const MAGIC_SIZE: usize = 4;
const LENGTH_PREFIX_SIZE: usize = 4;
const TERMINATOR_SIZE: usize = 2;

// ── Signature validator ──────────────────────────────────────────────

/// Cheap pre-check: the buffer must start with `0xFE`.
///
/// Only rejects obviously wrong files; the magic check in [`decode`] is the
/// authoritative format test.
pub fn check_signature(raw: &[u8]) -> RfcResult<()> {
    match raw.first() {
        Some(&SIGNATURE_BYTE) => Ok(()),
        _ => Err(RfcError::InvalidSignature),
    }
}

// ── Record decoder ───────────────────────────────────────────────────

/// Decode a whole cache into a [`DecodedCache`].
///
/// `source_file` and `provenance` are stored as given; the decoder never
/// touches the filesystem. Either every record decodes or an error is returned.
pub fn decode(
    raw: &[u8],
    source_file: impl Into<String>,
    provenance: Provenance,
) -> RfcResult<DecodedCache> {
    let file_names = decode_file_names(raw)?;
    Ok(DecodedCache::new(source_file.into(), provenance, file_names))
}

/// Decode only the recorded paths, in order of appearance.
pub fn decode_file_names(raw: &[u8]) -> RfcResult<Vec<String>> {
    check_signature(raw)?;
    let mut reader = RecordReader::new(raw)?;

    let mut names = Vec::new();
    while let Some(name) = reader.next_record()? {
        names.push(name);
    }

    debug!("rfc: decoded {} records from {} bytes", names.len(), raw.len());
    Ok(names)
}

/// Sequential cursor over the record region of a cache.
///
/// Construction validates the magic and the fixed header; each call to
/// [`next_record`](RecordReader::next_record) consumes exactly one record.
pub struct RecordReader<'a> {
    data: &'a [u8],
    /// Offset of the next unread byte.
    cursor: usize,
    /// Number of records returned so far.
    index: usize,
    /// Set after an error so iteration stops.
    failed: bool,
}

impl<'a> RecordReader<'a> {
    /// Validate the header and position the cursor at the first record.
    pub fn new(data: &'a [u8]) -> RfcResult<Self> {
        let magic = read_magic(data);
        if magic != HEADER_MAGIC {
            return Err(RfcError::InvalidHeader { found: magic });
        }
        // Valid magic but the reserved region is cut short.
        if data.len() < RECORDS_OFFSET {
            return Err(RfcError::TruncatedRecord {
                offset: MAGIC_SIZE,
                needed: RECORDS_OFFSET - MAGIC_SIZE,
                available: data.len() - MAGIC_SIZE,
            });
        }

        trace!("rfc: header ok, {} bytes of records", data.len() - RECORDS_OFFSET);

        Ok(RecordReader {
            data,
            cursor: RECORDS_OFFSET,
            index: 0,
            failed: false,
        })
    }

    /// Current cursor position.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    /// Decode the next record, or `None` once the cursor sits exactly at the end.
    pub fn next_record(&mut self) -> RfcResult<Option<String>> {
        if self.failed || self.cursor >= self.data.len() {
            return Ok(None);
        }

        let record_offset = self.cursor;
        let result = self.read_record();
        match &result {
            Ok(name) => {
                trace!(
                    "rfc: record {} at {:#x}: {} chars",
                    self.index,
                    record_offset,
                    name.encode_utf16().count()
                );
                self.index += 1;
            }
            Err(_) => self.failed = true,
        }
        result.map(Some)
    }

    fn read_record(&mut self) -> RfcResult<String> {
        let prefix = self.take(LENGTH_PREFIX_SIZE)?;
        let char_count = i32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);

        // A negative length is reported by its magnitude.
        let body_len = (char_count.unsigned_abs() as usize).saturating_mul(2);
        if char_count < 0 {
            return Err(RfcError::TruncatedRecord {
                offset: self.cursor,
                needed: body_len,
                available: self.remaining(),
            });
        }

        let body = self.take(body_len)?;
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        let name = String::from_utf16_lossy(&units);

        let terminator = self.take(TERMINATOR_SIZE)?;
        if terminator != [0, 0] {
            trace!(
                "rfc: non-zero terminator {:02x}{:02x} after record {}",
                terminator[1],
                terminator[0],
                self.index
            );
        }

        Ok(name)
    }

    /// Consume `len` bytes or fail without moving the cursor.
    fn take(&mut self, len: usize) -> RfcResult<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(RfcError::TruncatedRecord {
                offset: self.cursor,
                needed: len,
                available,
            });
        }
        let data: &'a [u8] = self.data;
        let slice = &data[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(slice)
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.cursor)
    }
}

impl Iterator for RecordReader<'_> {
    type Item = RfcResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Little-endian u32 at offset 0; short buffers are zero-padded.
fn read_magic(data: &[u8]) -> u32 {
    let mut bytes = [0u8; MAGIC_SIZE];
    let n = data.len().min(MAGIC_SIZE);
    bytes[..n].copy_from_slice(&data[..n]);
    u32::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Build a cache image from a list of paths.
    fn build_cache(names: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&HEADER_MAGIC.to_le_bytes());
        buf.extend_from_slice(&[0u8; 16]);
        for name in names {
            let units: Vec<u16> = name.encode_utf16().collect();
            buf.extend_from_slice(&(units.len() as i32).to_le_bytes());
            for u in units {
                buf.extend_from_slice(&u.to_le_bytes());
            }
            buf.extend_from_slice(&[0, 0]);
        }
        buf
    }

    fn provenance() -> Provenance {
        let t = Utc.with_ymd_and_hms(2015, 7, 4, 8, 15, 0).unwrap();
        Provenance::new(t, t, t)
    }

    #[test]
    fn test_single_record() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&[0xFE, 0xFF, 0xEE, 0xFF]);
        raw.extend_from_slice(&[0u8; 16]);
        raw.extend_from_slice(&4i32.to_le_bytes());
        raw.extend_from_slice(&[b't', 0, b'e', 0, b's', 0, b't', 0]);
        raw.extend_from_slice(&[0, 0]);

        let cache = decode(&raw, "C:\\test.bcf", provenance()).unwrap();
        assert_eq!(cache.file_names(), ["test".to_string()]);
        assert_eq!(cache.source_file(), "C:\\test.bcf");
        assert_eq!(cache.provenance(), provenance());
    }

    #[test]
    fn test_header_only() {
        let raw = build_cache(&[]);
        assert_eq!(raw.len(), RECORDS_OFFSET);
        assert!(decode_file_names(&raw).unwrap().is_empty());
    }

    #[test]
    fn test_empty_record_counts() {
        let raw = build_cache(&["", "c:\\a.exe", ""]);
        let names = decode_file_names(&raw).unwrap();
        assert_eq!(names, vec!["", "c:\\a.exe", ""]);
    }

    #[test]
    fn test_order_preserved() {
        let names = ["c:\\z.exe", "C:\\A.EXE", "c:\\z.exe", "c:\\m.exe"];
        let decoded = decode_file_names(&build_cache(&names)).unwrap();
        assert_eq!(decoded, names);
    }

    #[test]
    fn test_non_bmp_and_embedded_nul() {
        let names = ["c:\\users\\\u{00e9}t\u{00e9}\\\u{1F600}.exe", "a\0b"];
        let decoded = decode_file_names(&build_cache(&names)).unwrap();
        assert_eq!(decoded, names);
    }

    #[test]
    fn test_unpaired_surrogate_is_lossy() {
        let mut raw = build_cache(&[]);
        raw.extend_from_slice(&1i32.to_le_bytes());
        raw.extend_from_slice(&0xD800u16.to_le_bytes());
        raw.extend_from_slice(&[0, 0]);
        assert_eq!(decode_file_names(&raw).unwrap(), vec!["\u{FFFD}"]);
    }

    #[test]
    fn test_invalid_signature() {
        assert!(matches!(decode_file_names(&[]), Err(RfcError::InvalidSignature)));
        let mut raw = build_cache(&["x"]);
        raw[0] = 0x00;
        assert!(matches!(decode_file_names(&raw), Err(RfcError::InvalidSignature)));
    }

    #[test]
    fn test_invalid_header() {
        let mut raw = build_cache(&["x"]);
        raw[3] = 0x00;
        match decode_file_names(&raw) {
            Err(RfcError::InvalidHeader { found }) => assert_eq!(found, 0x00EE_FFFE),
            other => panic!("Expected InvalidHeader, got: {:?}", other),
        }
        // Signature byte alone passes the pre-check but not the magic check.
        assert!(matches!(
            decode_file_names(&[0xFE]),
            Err(RfcError::InvalidHeader { found: 0xFE })
        ));
    }

    #[test]
    fn test_short_reserved_region() {
        let raw = build_cache(&[]);
        match decode_file_names(&raw[..12]) {
            Err(RfcError::TruncatedRecord { offset, needed, available }) => {
                assert_eq!(offset, 4);
                assert_eq!(needed, 16);
                assert_eq!(available, 8);
            }
            other => panic!("Expected TruncatedRecord, got: {:?}", other),
        }
    }

    #[test]
    fn test_negative_length() {
        let mut raw = build_cache(&[]);
        raw.extend_from_slice(&(-1i32).to_le_bytes());
        raw.extend_from_slice(&[0, 0]);
        assert!(matches!(
            decode_file_names(&raw),
            Err(RfcError::TruncatedRecord { offset: 0x18, .. })
        ));
    }

    #[test]
    fn test_length_past_end() {
        let mut raw = build_cache(&[]);
        raw.extend_from_slice(&100i32.to_le_bytes());
        raw.extend_from_slice(&[b'a', 0, 0, 0]);
        match decode_file_names(&raw) {
            Err(RfcError::TruncatedRecord { offset, needed, available }) => {
                assert_eq!(offset, 0x18);
                assert_eq!(needed, 200);
                assert_eq!(available, 4);
            }
            other => panic!("Expected TruncatedRecord, got: {:?}", other),
        }
    }

    #[test]
    fn test_partial_length_prefix() {
        let mut raw = build_cache(&["ok"]);
        raw.extend_from_slice(&[3, 0]);
        assert!(matches!(
            decode_file_names(&raw),
            Err(RfcError::TruncatedRecord { needed: 4, available: 2, .. })
        ));
    }

    #[test]
    fn test_missing_terminator() {
        let raw = build_cache(&["abc"]);
        let err = decode_file_names(&raw[..raw.len() - 2]).unwrap_err();
        assert!(matches!(err, RfcError::TruncatedRecord { needed: 2, available: 0, .. }));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_nonzero_terminator_tolerated() {
        let mut raw = build_cache(&["abc", "def"]);
        let first_terminator = RECORDS_OFFSET + 4 + 6;
        raw[first_terminator] = 0x41;
        assert_eq!(decode_file_names(&raw).unwrap(), vec!["abc", "def"]);
    }

    #[test]
    fn test_reader_iterator_stops_after_error() {
        let mut raw = build_cache(&["one", "two"]);
        raw.truncate(raw.len() - 1);
        let mut reader = RecordReader::new(&raw).unwrap();
        assert_eq!(reader.next().unwrap().unwrap(), "one");
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_reader_offset_advances() {
        let raw = build_cache(&["ab"]);
        let mut reader = RecordReader::new(&raw).unwrap();
        assert_eq!(reader.offset(), RECORDS_OFFSET);
        reader.next_record().unwrap();
        assert_eq!(reader.offset(), raw.len());
        assert_eq!(reader.next_record().unwrap(), None);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let raw = build_cache(&["c:\\windows\\system32\\cmd.exe"]);
        let a = decode(&raw, "f", provenance()).unwrap();
        let b = decode(&raw, "f", provenance()).unwrap();
        assert_eq!(a, b);
    }
}

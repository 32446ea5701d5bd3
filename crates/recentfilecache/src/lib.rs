//! Decoder for the Windows `RecentFileCache.bcf` artifact.
//!
//! `RecentFileCache.bcf` is written by the Application Experience service on
//! Windows 7 / Server 2008 R2 and records the full paths of recently executed
//! programs. This crate provides:
//!
//! - A cheap first-byte signature check (`check_signature`)
//! - A pure decoder from raw bytes to an ordered list of paths (`decode`)
//! - `DecodedCache`, the immutable result carrying the source file's timestamps
//! - `load_file`, which reads a file and its filesystem timestamps from disk
//!
//! # Example
//!
//! ```rust,ignore
//! use recentfilecache::load_file;
//!
//! let cache = load_file(r"C:\Windows\AppCompat\Programs\RecentFileCache.bcf")?;
//! for name in cache.file_names() {
//!     println!("{name}");
//! }
//! ```

pub mod error;
pub mod loader;
pub mod parser;
pub mod types;

// Re-export key types at crate root.
pub use error::{RfcError, RfcResult};
pub use loader::load_file;
pub use parser::{check_signature, decode, decode_file_names, RecordReader};
pub use types::{DecodedCache, Provenance};

//! MD5 checksum utility for tamper detection.
//!
//! Checksums are always taken over the raw file bytes, before template
//! rendering, so that environment-specific variables never change them.
//! MD5 hex is the format existing `schema_migrations` ledgers already hold
//! in their `VARCHAR(32)` checksum column.

use md5::{Digest, Md5};

/// Length of a hex-encoded checksum
pub const CHECKSUM_LEN: usize = 32;

/// Compute the MD5 checksum of raw script bytes as lowercase hex
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;

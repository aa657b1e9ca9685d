//! SHA-256 digests of downloaded artifacts.
//!
//! Digests are computed on demand from file contents and never cached.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Length of a SHA-256 digest in hex characters.
pub const SHA256_HEX_LEN: usize = 64;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large archives.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Like [`sha256_file`] but with the path attached to any error.
pub fn sha256_path(path: &Path) -> Result<String> {
    sha256_file(path).with_context(|| format!("hash {}", path.display()))
}

/// Normalize an expected SHA-256 digest to lowercase hex.
/// Returns None unless the input is exactly 64 hex characters.
pub fn normalize_sha256(expected: &str) -> Option<String> {
    let trimmed = expected.trim();
    if trimmed.len() != SHA256_HEX_LEN || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}

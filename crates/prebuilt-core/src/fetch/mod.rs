//! Integrity-checked fetcher.
//!
//! Guarantees that after a successful call a local file exists whose SHA-256
//! equals the expected digest. A file that already verifies is left alone;
//! otherwise the resource is transferred once and re-verified. There is no
//! retry: a failed transfer or a digest mismatch is returned to the caller.

mod source;
mod transfer;

pub use source::Source;
pub use transfer::{CurlOptions, DefaultTransfer, Transfer, TransferError};

use crate::checksum;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// One artifact to fetch: `base_url/filename`, expected to hash to `expected_hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub base_url: String,
    pub filename: String,
    pub expected_hash: String,
}

impl FetchRequest {
    pub fn new(
        base_url: impl Into<String>,
        filename: impl Into<String>,
        expected_hash: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            filename: filename.into(),
            expected_hash: expected_hash.into(),
        }
    }
}

/// What `ensure_fetched` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Local file already matched; nothing was transferred.
    AlreadyValid,
    /// File was (re)transferred and now matches.
    Downloaded { bytes: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid SHA-256 digest {0:?}: expected 64 hex characters")]
    InvalidDigest(String),
    #[error("invalid file name {0:?}: must be a relative path without '..'")]
    InvalidFilename(String),
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),
    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, FetchError::Integrity { .. })
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, FetchError::Transfer(_))
    }
}

/// Local path for `filename` under `dest_dir`. Rejects absolute paths, `..` and empty names.
pub fn local_path(dest_dir: &Path, filename: &str) -> Result<PathBuf, FetchError> {
    let rel = Path::new(filename);
    let safe = !filename.is_empty()
        && rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && rel.file_name().is_some();
    if !safe {
        return Err(FetchError::InvalidFilename(filename.to_string()));
    }
    Ok(dest_dir.join(rel))
}

/// Digest of the file at `path`, or None when there is no file.
fn existing_digest(path: &Path) -> Result<Option<String>, FetchError> {
    match checksum::sha256_file(path) {
        Ok(d) => Ok(Some(d)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(FetchError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Ensure `dest_dir/filename` exists and hashes to `expected_hash`, transferring
/// `base_url/filename` through `transfer` only when needed.
///
/// On failure the local file may be partially written or mismatched; the caller
/// decides whether to discard it.
pub fn ensure_fetched(
    request: &FetchRequest,
    dest_dir: &Path,
    transfer: &dyn Transfer,
) -> Result<FetchOutcome, FetchError> {
    let expected = checksum::normalize_sha256(&request.expected_hash)
        .ok_or_else(|| FetchError::InvalidDigest(request.expected_hash.clone()))?;
    let path = local_path(dest_dir, &request.filename)?;

    if let Some(actual) = existing_digest(&path)? {
        if actual == expected {
            tracing::debug!("{} already verified, skipping download", path.display());
            return Ok(FetchOutcome::AlreadyValid);
        }
        tracing::warn!(
            "{} has digest {}, expected {}; downloading again",
            path.display(),
            actual,
            expected
        );
    }

    let source = Source::resolve(&request.base_url, &request.filename)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| FetchError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    tracing::info!("downloading {} -> {}", source.display(), path.display());
    let bytes = transfer.retrieve(&source, &path)?;

    let actual = checksum::sha256_file(&path).map_err(|source| FetchError::Io {
        path: path.clone(),
        source,
    })?;
    if actual != expected {
        return Err(FetchError::Integrity {
            path,
            expected,
            actual,
        });
    }

    tracing::info!("verified {} ({} bytes)", path.display(), bytes);
    Ok(FetchOutcome::Downloaded { bytes })
}

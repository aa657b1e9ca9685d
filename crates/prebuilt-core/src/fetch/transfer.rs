//! Content transfer: copy one resource into one local file.
//!
//! URLs go through libcurl (blocking easy handle); local prefixes are plain copies.

use super::source::Source;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retrieval failed; distinct from an integrity failure.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("invalid base URL {base}: {reason}")]
    InvalidUrl { base: String, reason: String },
    #[error("GET {url} failed: {source}")]
    Curl {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("GET {url} returned HTTP {code}")]
    Http { url: String, code: u32 },
    #[error("{} is both source and destination", .path.display())]
    SameFile { path: PathBuf },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TransferError {
    fn io(path: &Path, source: io::Error) -> Self {
        TransferError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Retrieves a resource into `dest`, truncating whatever was there.
/// Returns the number of bytes written.
pub trait Transfer {
    fn retrieve(&self, source: &Source, dest: &Path) -> Result<u64, TransferError>;
}

/// libcurl options for URL transfers.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Abort if throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

/// Default transfer: libcurl for URLs, filesystem copy for local paths.
#[derive(Debug, Clone, Default)]
pub struct DefaultTransfer {
    pub curl: CurlOptions,
}

impl Transfer for DefaultTransfer {
    fn retrieve(&self, source: &Source, dest: &Path) -> Result<u64, TransferError> {
        match source {
            Source::Url(url) => {
                if url.scheme() == "file" {
                    if let Ok(from) = url.to_file_path() {
                        reject_same_file(&from, dest)?;
                    }
                }
                curl_get(url.as_str(), source.is_http(), dest, self.curl)
            }
            Source::Local(path) => copy_local(path, dest),
        }
    }
}

/// Truncating `dest` would also wipe the source when both name the same file.
fn reject_same_file(from: &Path, dest: &Path) -> Result<(), TransferError> {
    match (fs::canonicalize(from), fs::canonicalize(dest)) {
        (Ok(a), Ok(b)) if a == b => Err(TransferError::SameFile { path: b }),
        _ => Ok(()),
    }
}

fn copy_local(from: &Path, dest: &Path) -> Result<u64, TransferError> {
    reject_same_file(from, dest)?;
    tracing::debug!("copying {} -> {}", from.display(), dest.display());
    fs::copy(from, dest).map_err(|e| TransferError::io(from, e))
}

/// Single GET written sequentially into `dest`.
fn curl_get(url: &str, check_status: bool, dest: &Path, opts: CurlOptions) -> Result<u64, TransferError> {
    let curl_err = |source: curl::Error| TransferError::Curl {
        url: url.to_string(),
        source,
    };

    let mut file = File::create(dest).map_err(|e| TransferError::io(dest, e))?;
    let mut written = 0u64;
    let mut write_error: Option<io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_err)?;
    easy.follow_location(true).map_err(curl_err)?;
    easy.max_redirections(10).map_err(curl_err)?;
    easy.connect_timeout(opts.connect_timeout).map_err(curl_err)?;
    easy.low_speed_limit(opts.low_speed_limit).map_err(curl_err)?;
    easy.low_speed_time(opts.low_speed_time).map_err(curl_err)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| match file.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_error = Some(e);
                    Ok(0) // abort transfer
                }
            })
            .map_err(curl_err)?;
        transfer.perform()
    };

    if let Some(e) = write_error {
        return Err(TransferError::io(dest, e));
    }
    performed.map_err(curl_err)?;

    if check_status {
        let code = easy.response_code().map_err(curl_err)?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http {
                url: url.to_string(),
                code,
            });
        }
    }

    file.flush().map_err(|e| TransferError::io(dest, e))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_copy_overwrites_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("src.bin");
        let dest = dir.path().join("dest.bin");
        fs::write(&from, b"fresh").unwrap();
        fs::write(&dest, b"stale content that is longer").unwrap();

        let n = DefaultTransfer::default()
            .retrieve(&Source::Local(from), &dest)
            .unwrap();
        assert_eq!(n, 5);
        assert_eq!(fs::read(&dest).unwrap(), b"fresh");
    }

    #[test]
    fn local_copy_missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DefaultTransfer::default()
            .retrieve(
                &Source::Local(dir.path().join("absent")),
                &dir.path().join("dest"),
            )
            .unwrap_err();
        assert!(matches!(err, TransferError::Io { .. }));
    }

    #[test]
    fn local_copy_onto_itself_is_refused_and_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.tar.bz2");
        fs::write(&path, b"archive bytes").unwrap();
        let aliased = dir.path().join(".").join("lib.tar.bz2");

        let err = DefaultTransfer::default()
            .retrieve(&Source::Local(aliased), &path)
            .unwrap_err();
        assert!(matches!(err, TransferError::SameFile { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"archive bytes");
    }

    #[test]
    fn file_url_onto_itself_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("served.txt");
        fs::write(&path, b"keep me").unwrap();
        let base = url::Url::from_directory_path(dir.path()).unwrap();
        let source = Source::resolve(base.as_str(), "served.txt").unwrap();

        let err = DefaultTransfer::default().retrieve(&source, &path).unwrap_err();
        assert!(matches!(err, TransferError::SameFile { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"keep me");
    }

    #[test]
    fn file_url_is_fetched_through_curl() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("served.txt");
        fs::write(&from, b"served over file://").unwrap();
        let base = url::Url::from_directory_path(dir.path()).unwrap();
        let source = Source::resolve(base.as_str(), "served.txt").unwrap();
        let dest = dir.path().join("copy.txt");

        let n = DefaultTransfer::default().retrieve(&source, &dest).unwrap();
        assert_eq!(n, 19);
        assert_eq!(fs::read(&dest).unwrap(), b"served over file://");
    }
}

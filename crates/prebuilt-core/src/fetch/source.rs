//! Resolve `base_url/filename` into something a transfer can read from.

use super::transfer::TransferError;
use std::path::{Path, PathBuf};
use url::Url;

/// Where the bytes for one artifact come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Network or `file://` URL, fetched with libcurl.
    Url(Url),
    /// Plain filesystem path (base was a directory prefix, not a URL).
    Local(PathBuf),
}

impl Source {
    /// Join `filename` onto `base`. A base that parses as a URL with a real scheme is
    /// treated as a URL; anything else is a local directory prefix.
    pub fn resolve(base: &str, filename: &str) -> Result<Source, TransferError> {
        match Url::parse(base) {
            // Single-letter schemes are Windows drive letters, e.g. `C:\mirror`.
            Ok(url) if url.scheme().len() > 1 => join_url(url, filename).map(Source::Url),
            Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Source::Local(Path::new(base).join(filename)))
            }
            Err(e) => Err(TransferError::InvalidUrl {
                base: base.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// True for schemes where a numeric HTTP status is meaningful.
    pub fn is_http(&self) -> bool {
        matches!(self, Source::Url(u) if u.scheme() == "http" || u.scheme() == "https")
    }

    pub fn display(&self) -> String {
        match self {
            Source::Url(u) => u.to_string(),
            Source::Local(p) => p.display().to_string(),
        }
    }
}

fn join_url(mut base: Url, filename: &str) -> Result<Url, TransferError> {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(filename).map_err(|e| TransferError::InvalidUrl {
        base: base.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_without_trailing_slash() {
        let src = Source::resolve("https://example.org/dist", "lib.tar.bz2").unwrap();
        assert_eq!(
            src,
            Source::Url(Url::parse("https://example.org/dist/lib.tar.bz2").unwrap())
        );
        assert!(src.is_http());
    }

    #[test]
    fn joins_base_with_trailing_slash() {
        let src = Source::resolve("https://example.org/dist/", "lib.tar.bz2").unwrap();
        assert_eq!(src.display(), "https://example.org/dist/lib.tar.bz2");
    }

    #[test]
    fn file_url_is_not_http() {
        let src = Source::resolve("file:///srv/mirror", "a.tar.gz").unwrap();
        assert_eq!(src.display(), "file:///srv/mirror/a.tar.gz");
        assert!(!src.is_http());
    }

    #[test]
    fn plain_directory_is_local() {
        let src = Source::resolve("/srv/mirror", "a.tar.gz").unwrap();
        assert_eq!(src, Source::Local(PathBuf::from("/srv/mirror/a.tar.gz")));
        let rel = Source::resolve("mirror", "a.tar.gz").unwrap();
        assert_eq!(rel, Source::Local(PathBuf::from("mirror/a.tar.gz")));
    }

    #[test]
    fn drive_letter_is_local() {
        let src = Source::resolve("C:/mirror", "a.zip").unwrap();
        assert!(matches!(src, Source::Local(_)));
    }
}

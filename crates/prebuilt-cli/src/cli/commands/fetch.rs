//! `prebuilt fetch <base_url> <filename> <sha256>` – integrity-checked download.

use anyhow::Result;
use prebuilt_core::fetch::{ensure_fetched, DefaultTransfer, FetchOutcome, FetchRequest};
use std::path::Path;

pub fn run_fetch(base_url: &str, filename: &str, sha256: &str, dir: &Path) -> Result<()> {
    let request = FetchRequest::new(base_url, filename, sha256);
    match ensure_fetched(&request, dir, &DefaultTransfer::default())? {
        FetchOutcome::AlreadyValid => println!("ok {}", filename),
        FetchOutcome::Downloaded { bytes } => println!("fetched {} ({} bytes)", filename, bytes),
    }
    Ok(())
}

//! `prebuilt checksum <path>` – compute SHA-256 of a file.

use anyhow::Result;
use prebuilt_core::checksum;
use std::path::Path;

/// Print `<digest>  <path>`, the format `sha256sum -c` reads.
pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::sha256_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}

//! Android ABIs the NDK can target.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Abi {
    ArmeabiV7a,
    Arm64V8a,
    X86,
    X86_64,
}

impl Abi {
    /// Name as passed to `-DANDROID_ABI` and used in jniLibs directories.
    pub fn as_str(&self) -> &'static str {
        match self {
            Abi::ArmeabiV7a => "armeabi-v7a",
            Abi::Arm64V8a => "arm64-v8a",
            Abi::X86 => "x86",
            Abi::X86_64 => "x86_64",
        }
    }

    /// Clang target triple prefix used by the NDK toolchain.
    pub fn ndk_triple(&self) -> &'static str {
        match self {
            Abi::ArmeabiV7a => "armv7a-linux-androideabi",
            Abi::Arm64V8a => "aarch64-linux-android",
            Abi::X86 => "i686-linux-android",
            Abi::X86_64 => "x86_64-linux-android",
        }
    }

    pub fn all() -> &'static [Abi] {
        &[Abi::ArmeabiV7a, Abi::Arm64V8a, Abi::X86, Abi::X86_64]
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Abi {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "armeabi-v7a" => Ok(Abi::ArmeabiV7a),
            "arm64-v8a" => Ok(Abi::Arm64V8a),
            "x86" => Ok(Abi::X86),
            "x86_64" => Ok(Abi::X86_64),
            other => {
                let known: Vec<&str> = Abi::all().iter().map(Abi::as_str).collect();
                bail!("unknown ABI {:?} (expected one of {})", other, known.join(", "))
            }
        }
    }
}

/// Parse a `,`-separated ABI list such as `armeabi-v7a,arm64-v8a`.
/// Whitespace and empty items are ignored; duplicates keep their first position.
pub fn parse_abi_list(list: &str) -> Result<Vec<Abi>> {
    let mut abis = Vec::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let abi: Abi = item.parse()?;
        if !abis.contains(&abi) {
            abis.push(abi);
        }
    }
    if abis.is_empty() {
        bail!("ABI list {:?} is empty", list);
    }
    Ok(abis)
}

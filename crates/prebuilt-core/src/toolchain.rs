//! Android toolchain locations derived from the environment.
//!
//! Everything the build steps need from `ANDROID_*` variables is read once into
//! [`Toolchain`] and passed down explicitly.

use crate::abi::{parse_abi_list, Abi};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

pub const ENV_SDK_ROOT: &str = "ANDROID_SDK_ROOT";
pub const ENV_NDK_ROOT: &str = "ANDROID_NDK_ROOT";
pub const ENV_CMAKE_VERSION: &str = "ANDROID_SDK_CMAKE_VERSION";
pub const ENV_PLATFORM: &str = "ANDROID_PLATFORM";
pub const ENV_ABI: &str = "ANDROID_ABI";

const REQUIRED: &[(&str, &str)] = &[
    (ENV_SDK_ROOT, "ANDROID_SDK_ROOT should be set to Android SDK path."),
    (ENV_NDK_ROOT, "ANDROID_NDK_ROOT should be set to Android NDK path."),
    (
        ENV_CMAKE_VERSION,
        "ANDROID_SDK_CMAKE_VERSION should be set to desired cmake version in $ANDROID_SDK_ROOT/cmake. eg. 3.18.1",
    ),
    (
        ENV_PLATFORM,
        "ANDROID_PLATFORM should be set to minimum API level supported by the library. eg. 21",
    ),
    (
        ENV_ABI,
        "ANDROID_ABI not set; can be a ',' separated list. eg. armeabi-v7a,arm64-v8a",
    ),
];

/// Resolved SDK/NDK paths and target settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub sdk_root: PathBuf,
    pub ndk_root: PathBuf,
    pub cmake_version: String,
    /// Minimum API level, passed through as `ANDROID_PLATFORM`.
    pub platform: String,
    pub abis: Vec<Abi>,
    pub cmake: PathBuf,
    pub ninja: PathBuf,
}

/// Overrides from the command line; `None` keeps the environment value.
#[derive(Debug, Clone, Default)]
pub struct ToolchainOverrides {
    pub platform: Option<String>,
    pub abis: Option<Vec<Abi>>,
}

impl Toolchain {
    /// Read the toolchain from the process environment.
    pub fn from_env(overrides: &ToolchainOverrides) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Read the toolchain through `lookup` (e.g. a map in tests).
    /// Variables covered by `overrides` may be absent.
    pub fn from_lookup<F>(lookup: F, overrides: &ToolchainOverrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Result<String> {
            match lookup(key).filter(|v| !v.is_empty()) {
                Some(v) => Ok(v),
                None => {
                    let msg = REQUIRED
                        .iter()
                        .find(|(k, _)| *k == key)
                        .map(|(_, m)| *m)
                        .unwrap_or("required environment variable is not set");
                    bail!("{}", msg)
                }
            }
        };

        let sdk_root = PathBuf::from(get(ENV_SDK_ROOT)?);
        let ndk_root = PathBuf::from(get(ENV_NDK_ROOT)?);
        let cmake_version = get(ENV_CMAKE_VERSION)?;
        let platform = match &overrides.platform {
            Some(p) => p.clone(),
            None => get(ENV_PLATFORM)?,
        };
        let abis = match &overrides.abis {
            Some(a) => a.clone(),
            None => {
                let raw = get(ENV_ABI)?;
                parse_abi_list(&raw).with_context(|| format!("parse {}", ENV_ABI))?
            }
        };

        let bin = sdk_root.join("cmake").join(&cmake_version).join("bin");
        Ok(Self {
            cmake: bin.join(exe("cmake")),
            ninja: bin.join(exe("ninja")),
            sdk_root,
            ndk_root,
            cmake_version,
            platform,
            abis,
        })
    }

    /// The NDK's CMake toolchain file.
    pub fn toolchain_file(&self) -> PathBuf {
        self.ndk_root
            .join("build")
            .join("cmake")
            .join("android.toolchain.cmake")
    }

    /// Fail unless the SDK's cmake binary exists.
    pub fn verify(&self) -> Result<()> {
        if !is_file(&self.cmake) {
            bail!("Cannot find cmake: '{}'", self.cmake.display());
        }
        if !is_file(&self.ninja) {
            tracing::warn!("ninja not found at {}", self.ninja.display());
        }
        Ok(())
    }
}

fn exe(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env(&[
            (ENV_SDK_ROOT, "/opt/android-sdk"),
            (ENV_NDK_ROOT, "/opt/android-ndk"),
            (ENV_CMAKE_VERSION, "3.18.1"),
            (ENV_PLATFORM, "21"),
            (ENV_ABI, "armeabi-v7a,arm64-v8a"),
        ])
    }

    #[test]
    fn resolves_paths_from_env() {
        let vars = full_env();
        let tc = Toolchain::from_lookup(|k| vars.get(k).cloned(), &Default::default()).unwrap();
        assert_eq!(tc.platform, "21");
        assert_eq!(tc.abis, vec![Abi::ArmeabiV7a, Abi::Arm64V8a]);
        let bin = Path::new("/opt/android-sdk/cmake/3.18.1/bin");
        assert_eq!(tc.cmake, bin.join(exe("cmake")));
        assert_eq!(tc.ninja, bin.join(exe("ninja")));
        assert_eq!(
            tc.toolchain_file(),
            Path::new("/opt/android-ndk/build/cmake/android.toolchain.cmake")
        );
    }

    #[test]
    fn each_missing_variable_has_its_own_message() {
        for (key, msg) in REQUIRED {
            let mut vars = full_env();
            vars.remove(*key);
            let err = Toolchain::from_lookup(|k| vars.get(k).cloned(), &Default::default())
                .unwrap_err();
            assert_eq!(err.to_string(), *msg);
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut vars = full_env();
        vars.insert(ENV_NDK_ROOT.to_string(), String::new());
        let err =
            Toolchain::from_lookup(|k| vars.get(k).cloned(), &Default::default()).unwrap_err();
        assert!(err.to_string().starts_with("ANDROID_NDK_ROOT"));
    }

    #[test]
    fn overrides_replace_platform_and_abis() {
        let mut vars = full_env();
        vars.remove(ENV_ABI);
        vars.remove(ENV_PLATFORM);
        let overrides = ToolchainOverrides {
            platform: Some("24".into()),
            abis: Some(vec![Abi::X86_64]),
        };
        let tc = Toolchain::from_lookup(|k| vars.get(k).cloned(), &overrides).unwrap();
        assert_eq!(tc.platform, "24");
        assert_eq!(tc.abis, vec![Abi::X86_64]);
    }

    #[test]
    fn verify_requires_cmake_binary() {
        let sdk = tempfile::tempdir().unwrap();
        let mut vars = full_env();
        vars.insert(ENV_SDK_ROOT.to_string(), sdk.path().display().to_string());
        let tc = Toolchain::from_lookup(|k| vars.get(k).cloned(), &Default::default()).unwrap();

        let err = tc.verify().unwrap_err();
        assert!(err.to_string().starts_with("Cannot find cmake: '"));

        std::fs::create_dir_all(tc.cmake.parent().unwrap()).unwrap();
        std::fs::write(&tc.cmake, b"").unwrap();
        tc.verify().unwrap();
    }
}

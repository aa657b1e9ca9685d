use crate::cmake::CMakeSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Global configuration loaded from `~/.config/prebuilt/config.toml`.
///
/// Toolchain locations are not stored here; they come from `ANDROID_*` variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrebuiltConfig {
    /// Directory holding the library sources (None = current directory).
    #[serde(default)]
    pub source_root: Option<PathBuf>,
    /// Directory receiving `<library>/<abi>` install trees (None = current directory).
    #[serde(default)]
    pub install_root: Option<PathBuf>,
    /// `ANDROID_STL` passed to every CMake build.
    #[serde(default = "default_stl")]
    pub stl: String,
    /// `CMAKE_BUILD_TYPE` passed to every CMake build.
    #[serde(default = "default_build_type")]
    pub build_type: String,
    /// Base URL or directory used instead of each archive's upstream location.
    #[serde(default)]
    pub archive_mirror: Option<String>,
}

fn default_stl() -> String {
    CMakeSettings::default().stl
}

fn default_build_type() -> String {
    CMakeSettings::default().build_type
}

impl Default for PrebuiltConfig {
    fn default() -> Self {
        Self {
            source_root: None,
            install_root: None,
            stl: default_stl(),
            build_type: default_build_type(),
            archive_mirror: None,
        }
    }
}

impl PrebuiltConfig {
    pub fn cmake_settings(&self) -> CMakeSettings {
        CMakeSettings {
            stl: self.stl.clone(),
            build_type: self.build_type.clone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("prebuilt")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PrebuiltConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<PrebuiltConfig> {
    if !path.exists() {
        let default_cfg = PrebuiltConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: PrebuiltConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

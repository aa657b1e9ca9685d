//! Build driver: for every ABI, build every selected library and install it
//! under `<install_root>/<library>/<abi>`.
//!
//! Archive sources are fetched and verified before anything is compiled; any
//! failure stops the whole run.

use crate::abi::Abi;
use crate::cmake::{CMakeBuild, CMakeSettings};
use crate::exec::{remove_dir_if_exists, CommandSpec, Runner};
use crate::fetch::{ensure_fetched, FetchOutcome, FetchRequest, Transfer};
use crate::recipe::{ArchiveSpec, Recipe, RecipeKind};
use crate::toolchain::Toolchain;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Where sources are read from and installs are written to. Both absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub source_root: PathBuf,
    pub install_root: PathBuf,
}

impl Layout {
    /// Resolve relative roots against the current directory.
    pub fn new(source_root: &Path, install_root: &Path) -> Result<Self> {
        let cwd = std::env::current_dir().context("current directory")?;
        Ok(Self {
            source_root: cwd.join(source_root),
            install_root: cwd.join(install_root),
        })
    }

    pub fn install_dir(&self, recipe: &Recipe, abi: Abi) -> PathBuf {
        self.install_root.join(recipe.name).join(abi.as_str())
    }
}

/// One finished (library, ABI) build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Built {
    pub library: &'static str,
    pub abi: Abi,
    pub install_dir: PathBuf,
}

pub struct Orchestrator<'a> {
    toolchain: &'a Toolchain,
    settings: CMakeSettings,
    layout: Layout,
    archive_mirror: Option<String>,
    runner: &'a mut dyn Runner,
    transfer: &'a dyn Transfer,
}

fn banner(msg: &str) {
    println!(">>> {}", msg);
    tracing::info!("{}", msg);
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        toolchain: &'a Toolchain,
        settings: CMakeSettings,
        layout: Layout,
        runner: &'a mut dyn Runner,
        transfer: &'a dyn Transfer,
    ) -> Self {
        Self {
            toolchain,
            settings,
            layout,
            archive_mirror: None,
            runner,
            transfer,
        }
    }

    /// Fetch archives from `mirror` instead of their upstream base URL.
    pub fn with_archive_mirror(mut self, mirror: Option<String>) -> Self {
        self.archive_mirror = mirror;
        self
    }

    /// Prepare sources, then build `recipes` for each ABI of the toolchain (ABI-major order).
    pub fn run(&mut self, recipes: &[&'static Recipe]) -> Result<Vec<Built>> {
        for recipe in recipes {
            self.prepare_source(recipe)?;
        }

        let toolchain = self.toolchain;
        let mut built = Vec::new();
        for &abi in &toolchain.abis {
            for recipe in recipes {
                let install_dir = self
                    .build(recipe, abi)
                    .with_context(|| format!("build {} for {}", recipe.name, abi))?;
                built.push(Built {
                    library: recipe.name,
                    abi,
                    install_dir,
                });
            }
        }
        Ok(built)
    }

    /// Fetch, verify and unpack archive sources. CMake sources are used as checked out.
    pub fn prepare_source(&mut self, recipe: &Recipe) -> Result<()> {
        let RecipeKind::Archive(archive) = &recipe.kind else {
            return Ok(());
        };
        let dir = self.layout.source_root.join(recipe.source_dir);
        let base = self
            .archive_mirror
            .as_deref()
            .unwrap_or(archive.base_url);
        let request = FetchRequest::new(base, archive.filename, archive.sha256);
        let outcome = ensure_fetched(&request, &dir, self.transfer)
            .with_context(|| format!("fetch {} source", recipe.name))?;

        let extracted = dir.join(archive.extracted_dir);
        let stale = matches!(outcome, FetchOutcome::Downloaded { .. });
        if extracted.exists() && !stale {
            tracing::debug!("{} already extracted", extracted.display());
            return Ok(());
        }
        if remove_dir_if_exists(&extracted)? {
            tracing::debug!("removed stale {}", extracted.display());
        }
        banner(&format!("Extracting {}", archive.filename));
        let tar = CommandSpec::new("tar")
            .arg("-xf")
            .arg(dir.join(archive.filename))
            .arg("-C")
            .arg(&dir);
        self.runner.run(&tar)?;
        Ok(())
    }

    /// Build and install one library for one ABI. Returns the install prefix.
    pub fn build(&mut self, recipe: &Recipe, abi: Abi) -> Result<PathBuf> {
        let unresolved = self.layout.source_root.join(recipe.source_dir);
        let source_dir = fs::canonicalize(&unresolved)
            .with_context(|| format!("{} source not found at {}", recipe.name, unresolved.display()))?;
        let build_dir = source_dir.join(format!("build_{}", abi));
        let install_dir = self.layout.install_dir(recipe, abi);

        if build_dir.exists() {
            banner("Cleaning previous build intermediates");
            remove_dir_if_exists(&build_dir)
                .with_context(|| format!("remove {}", build_dir.display()))?;
        }

        banner(&format!("Building {} for {}", recipe.name, abi));
        match recipe.kind {
            RecipeKind::CMake {
                defines,
                remove_after_install,
            } => {
                let cmake = CMakeBuild {
                    toolchain: self.toolchain,
                    settings: &self.settings,
                    abi,
                    source_dir,
                    build_dir,
                    install_dir: install_dir.clone(),
                    defines,
                };
                self.runner.run(&cmake.configure())?;
                self.runner.run(&cmake.build_install())?;
                remove_installed(&install_dir, remove_after_install)?;
            }
            RecipeKind::Archive(archive) => {
                let spec =
                    self.script_command(&archive, &source_dir, &build_dir, &install_dir, abi)?;
                self.runner.run(&spec)?;
            }
        }
        Ok(install_dir)
    }

    fn script_command(
        &self,
        archive: &ArchiveSpec,
        source_dir: &Path,
        build_dir: &Path,
        install_dir: &Path,
        abi: Abi,
    ) -> Result<CommandSpec> {
        let script = source_dir.join(archive.build_script);
        if !script.is_file() {
            bail!("build script not found: {}", script.display());
        }
        let tc = self.toolchain;
        Ok(CommandSpec::new("sh")
            .arg(script)
            .current_dir(source_dir)
            .env("ANDROID_NDK_ROOT", &tc.ndk_root)
            .env("ANDROID_ABI", abi.as_str())
            .env("ANDROID_PLATFORM", &tc.platform)
            .env("ANDROID_STL", &self.settings.stl)
            .env("ANDROID_TARGET_TRIPLE", abi.ndk_triple())
            .env("SOURCE_DIR", source_dir.join(archive.extracted_dir))
            .env("BUILD_DIR", build_dir)
            .env("INSTALL_PREFIX", install_dir))
    }
}

/// Delete `paths` (relative to `install_dir`) that the install step produced but we don't ship.
fn remove_installed(install_dir: &Path, paths: &[&str]) -> Result<()> {
    for rel in paths {
        let path = install_dir.join(rel);
        if path.is_dir() {
            remove_dir_if_exists(&path).with_context(|| format!("remove {}", path.display()))?;
        } else if path.exists() {
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        } else {
            tracing::debug!("{} not installed, nothing to remove", path.display());
        }
    }
    Ok(())
}

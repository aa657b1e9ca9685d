//! `prebuilt build` – cross-compile libraries for each configured ABI.

use anyhow::{Context, Result};
use prebuilt_core::abi::parse_abi_list;
use prebuilt_core::config::PrebuiltConfig;
use prebuilt_core::exec::SystemRunner;
use prebuilt_core::fetch::DefaultTransfer;
use prebuilt_core::orchestrate::{Layout, Orchestrator};
use prebuilt_core::recipe;
use prebuilt_core::toolchain::{Toolchain, ToolchainOverrides};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Flags of `prebuilt build`; `None` falls back to config, then environment.
#[derive(Debug, Default)]
pub struct BuildArgs {
    pub libs: Vec<String>,
    pub abi: Option<String>,
    pub platform: Option<String>,
    pub source_root: Option<PathBuf>,
    pub install_root: Option<PathBuf>,
}

fn overrides(args: &BuildArgs) -> Result<ToolchainOverrides> {
    let abis = match &args.abi {
        Some(list) => Some(parse_abi_list(list).context("--abi")?),
        None => None,
    };
    Ok(ToolchainOverrides {
        platform: args.platform.clone(),
        abis,
    })
}

fn layout(cfg: &PrebuiltConfig, args: &BuildArgs) -> Result<Layout> {
    let here = Path::new(".");
    let source_root = args
        .source_root
        .as_deref()
        .or(cfg.source_root.as_deref())
        .unwrap_or(here);
    let install_root = args
        .install_root
        .as_deref()
        .or(cfg.install_root.as_deref())
        .unwrap_or(here);
    Layout::new(source_root, install_root)
}

pub fn run_build(cfg: &PrebuiltConfig, args: BuildArgs) -> Result<()> {
    let recipes = recipe::select(args.libs.as_slice())?;
    let toolchain = Toolchain::from_env(&overrides(&args)?)?;
    toolchain.verify()?;
    let layout = layout(cfg, &args)?;
    let abis: Vec<&str> = toolchain.abis.iter().map(|a| a.as_str()).collect();
    tracing::info!(
        "building {} for {} (API {})",
        recipes.iter().map(|r| r.name).collect::<Vec<_>>().join(","),
        abis.join(","),
        toolchain.platform
    );

    let start = Instant::now();
    let mut runner = SystemRunner;
    let transfer = DefaultTransfer::default();
    let built = Orchestrator::new(
        &toolchain,
        cfg.cmake_settings(),
        layout,
        &mut runner,
        &transfer,
    )
    .with_archive_mirror(cfg.archive_mirror.clone())
    .run(&recipes)?;

    for b in &built {
        println!("{:<10} {:<12} {}", b.library, b.abi.as_str(), b.install_dir.display());
    }
    println!(
        "Built {} target(s) in {:.1}s",
        built.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

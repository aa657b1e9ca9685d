//! CLI for the prebuilt Android native-library builder.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use prebuilt_core::config;
use std::path::PathBuf;

use commands::{run_build, run_checksum, run_completions, run_fetch, run_list, BuildArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "prebuilt")]
#[command(
    about = "Fetch, verify and cross-compile third-party native libraries for Android",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Build libraries for every ABI in ANDROID_ABI (or --abi).
    Build {
        /// Library to build; repeat for several. Default: all.
        #[arg(long = "lib", value_name = "NAME")]
        libs: Vec<String>,
        /// Comma-separated ABI list overriding ANDROID_ABI, e.g. armeabi-v7a,arm64-v8a.
        #[arg(long, value_name = "LIST")]
        abi: Option<String>,
        /// Minimum API level overriding ANDROID_PLATFORM.
        #[arg(long, value_name = "LEVEL")]
        platform: Option<String>,
        /// Directory containing library sources (default: config, then current directory).
        #[arg(long, value_name = "DIR")]
        source_root: Option<PathBuf>,
        /// Directory receiving <library>/<abi> installs (default: config, then current directory).
        #[arg(long, value_name = "DIR")]
        install_root: Option<PathBuf>,
    },

    /// Download BASE_URL/FILENAME unless a local copy already matches SHA256.
    Fetch {
        /// Base URL (http, https, ftp, file) or local directory prefix.
        base_url: String,
        /// File name, relative to --dir.
        filename: String,
        /// Expected SHA-256 digest, 64 hex characters.
        sha256: String,
        /// Destination directory.
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },

    /// Compute SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// List the libraries this tool knows how to build.
    List,

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Build {
                libs,
                abi,
                platform,
                source_root,
                install_root,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let args = BuildArgs {
                    libs,
                    abi,
                    platform,
                    source_root,
                    install_root,
                };
                run_build(&cfg, args)?;
            }
            CliCommand::Fetch {
                base_url,
                filename,
                sha256,
                dir,
            } => run_fetch(&base_url, &filename, &sha256, &dir)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
            CliCommand::List => run_list(),
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;

//! Command-line interface implementation
//!
//! This module provides the CLI definition and dispatches to submodules
//! for specific command implementations.

mod build;
mod fmt;
mod import;
mod inspect;

use clap::{Parser, Subcommand};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{
    find_config_from, find_xdg_config, load_config, merge_cli_overrides, project_root, AnmConfig,
    CliOverrides, ConfigError,
};
use crate::models::MeshType;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// anmkit - Import sprite animation patterns into engine assets
#[derive(Parser)]
#[command(name = "anm")]
#[command(about = "Import .anm sprite animation patterns into sprites, timelines and a selector")]
#[command(version)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import one .anm file into the .asset container next to it
    Import {
        /// Source file (.anm)
        source: PathBuf,

        /// Timeline frame rate
        #[arg(long)]
        frame_rate: Option<u32>,

        /// Pixels per world unit for generated sprites
        #[arg(long)]
        pixels_per_unit: Option<f32>,

        /// Border extrusion in pixels
        #[arg(long)]
        extrude: Option<u32>,

        /// Sprite mesh type
        #[arg(long, value_enum)]
        mesh_type: Option<MeshType>,

        /// Strict mode: treat pattern failures and warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Import every .anm file in the project
    Build {
        /// Source directory (overrides anm.toml)
        #[arg(long)]
        src: Option<PathBuf>,

        /// Number of sources imported in parallel
        #[arg(short, long)]
        jobs: Option<usize>,

        /// List sources without importing
        #[arg(long)]
        dry_run: bool,

        /// Stop at the first failed source
        #[arg(long)]
        fail_fast: bool,

        /// Strict mode: treat pattern failures and warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Rebuild an .asset container from its recorded source and settings
    Reimport {
        /// Destination container (.asset)
        asset: PathBuf,
    },

    /// Rewrite .anm files in the canonical layout
    Fmt {
        /// Files to format
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Check formatting without writing (exit 1 if changes needed)
        #[arg(long)]
        check: bool,

        /// Write formatted output to stdout instead of the file
        #[arg(long)]
        stdout: bool,
    },

    /// Show the contents of an .asset container
    Inspect {
        /// Destination container (.asset)
        asset: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Import { source, frame_rate, pixels_per_unit, extrude, mesh_type, strict } => {
            let overrides = CliOverrides {
                frame_rate,
                pixels_per_unit,
                extrude,
                mesh_type,
                strict: strict.then_some(true),
                ..Default::default()
            };
            import::run_import(&source, &overrides)
        }
        Commands::Build { src, jobs, dry_run, fail_fast, strict } => {
            let overrides =
                CliOverrides { src, jobs, strict: strict.then_some(true), ..Default::default() };
            build::run_build(&overrides, dry_run, fail_fast)
        }
        Commands::Reimport { asset } => import::run_reimport(&asset),
        Commands::Fmt { files, check, stdout } => fmt::run_fmt(&files, check, stdout),
        Commands::Inspect { asset, json } => inspect::run_inspect(&asset, json),
    }
}

/// Install the logger. `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Configuration and project root for the working directory.
///
/// A project's `anm.toml` roots the project at its directory; the user-wide
/// config and the built-in defaults root it at the working directory.
pub(crate) fn load_project(overrides: &CliOverrides) -> Result<(AnmConfig, PathBuf), ConfigError> {
    let cwd = env::current_dir()?;
    let (mut config, root) = match find_config_from(cwd.clone()) {
        Some(path) => {
            log::info!("using config {}", path.display());
            let root = project_root(&path).map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());
            (load_config(Some(&path))?, root)
        }
        None => match find_xdg_config() {
            Some(path) => {
                log::info!("using config {}", path.display());
                (load_config(Some(&path))?, cwd)
            }
            None => {
                log::debug!("no anm.toml found, using defaults");
                (crate::config::default_config(), cwd)
            }
        },
    };

    merge_cli_overrides(&mut config, overrides);
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok((config, root))
}

/// Report a configuration error and pick the exit code for it.
pub(crate) fn config_failure(error: &ConfigError) -> ExitCode {
    eprintln!("Error loading config: {}", error);
    match error {
        ConfigError::Validation(_) => ExitCode::from(EXIT_INVALID_ARGS),
        _ => ExitCode::from(EXIT_ERROR),
    }
}

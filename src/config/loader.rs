//! Configuration loading and discovery for `anm.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{AnmConfig, ImportSettings, ProjectConfig, ValidateConfig, ValidationLevel};
use crate::models::MeshType;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up by [`find_config`].
pub const CONFIG_FILE_NAME: &str = "anm.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse anm.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override source directory
    pub src: Option<PathBuf>,
    /// Override timeline frame rate
    pub frame_rate: Option<u32>,
    /// Override pixels per unit
    pub pixels_per_unit: Option<f32>,
    /// Override border extrusion
    pub extrude: Option<u32>,
    /// Override mesh type
    pub mesh_type: Option<MeshType>,
    /// Enable strict validation
    pub strict: Option<bool>,
    /// Override empty pattern handling
    pub empty_patterns: Option<ValidationLevel>,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
}

/// Find anm.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for anm.toml
/// 2. Check XDG_CONFIG_HOME/anmkit/anm.toml (or ~/.config/anmkit/anm.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find anm.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("anmkit").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find anm.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from an anm.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns a default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("game/anm.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<AnmConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<AnmConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: AnmConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Create a default configuration when no anm.toml is found.
///
/// The project name is the current directory name.
pub fn default_config() -> AnmConfig {
    let project_name = env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unnamed".to_string());

    AnmConfig {
        project: ProjectConfig { name: project_name, src: PathBuf::from(".") },
        import: ImportSettings::default(),
        validate: ValidateConfig::default(),
    }
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut AnmConfig, overrides: &CliOverrides) {
    if let Some(ref src) = overrides.src {
        config.project.src = src.clone();
    }
    if let Some(frame_rate) = overrides.frame_rate {
        config.import.frame_rate = frame_rate;
    }
    if let Some(ppu) = overrides.pixels_per_unit {
        config.import.pixels_per_unit = ppu;
    }
    if let Some(extrude) = overrides.extrude {
        config.import.extrude = extrude;
    }
    if let Some(mesh_type) = overrides.mesh_type {
        config.import.mesh_type = mesh_type;
    }
    if let Some(strict) = overrides.strict {
        config.validate.strict = strict;
    }
    if let Some(level) = overrides.empty_patterns {
        config.validate.empty_patterns = level;
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

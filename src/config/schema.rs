//! Configuration schema types for `anm.toml`
//!
//! Defines the structure and validation rules for anmkit project configuration.

use crate::models::{MeshType, Vec2};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Validation severity level for config issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Treat as error, fail the pattern
    Error,
    /// Emit warning, continue build
    Warn,
    /// Silently ignore
    Ignore,
}

impl Default for ValidationLevel {
    fn default() -> Self {
        Self::Warn
    }
}

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,
    /// Directory searched for .anm files by `anm build`
    #[serde(default = "default_src")]
    pub src: PathBuf,
}

fn default_name() -> String {
    "unnamed".to_string()
}

fn default_src() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: default_name(), src: default_src() }
    }
}

/// Settings that shape the generated artifacts.
///
/// A copy of these is recorded in every destination container so that a
/// destination can be re-imported on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Frame rate of generated timelines
    #[serde(default = "default_frame_rate", alias = "frameRate")]
    pub frame_rate: u32,
    /// Normalized registration point `[x, y]`
    #[serde(default = "default_anchor")]
    pub anchor: [f32; 2],
    /// Pixels per world unit for generated sprites
    #[serde(default = "default_pixels_per_unit", alias = "pixelsPerUnit")]
    pub pixels_per_unit: f32,
    /// Border extrusion in pixels
    #[serde(default)]
    pub extrude: u32,
    /// Sprite mesh generation mode
    #[serde(default, alias = "meshType")]
    pub mesh_type: MeshType,
}

fn default_frame_rate() -> u32 {
    60
}

fn default_anchor() -> [f32; 2] {
    [0.5, 0.5]
}

fn default_pixels_per_unit() -> f32 {
    100.0
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            anchor: default_anchor(),
            pixels_per_unit: default_pixels_per_unit(),
            extrude: 0,
            mesh_type: MeshType::Tight,
        }
    }
}

impl ImportSettings {
    pub fn anchor(&self) -> Vec2 {
        Vec2::from(self.anchor)
    }

    /// Validate the settings, prefixing field paths with `prefix`.
    pub fn validate(&self, prefix: &str) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.frame_rate == 0 {
            errors.push(ConfigValidationError {
                field: format!("{}.frame_rate", prefix),
                message: "must be a positive integer".to_string(),
            });
        }

        if !self.pixels_per_unit.is_finite() || self.pixels_per_unit <= 0.0 {
            errors.push(ConfigValidationError {
                field: format!("{}.pixels_per_unit", prefix),
                message: "must be a positive number".to_string(),
            });
        }

        if !self.anchor.iter().all(|c| c.is_finite()) {
            errors.push(ConfigValidationError {
                field: format!("{}.anchor", prefix),
                message: "components must be finite numbers".to_string(),
            });
        }

        errors
    }
}

/// Validation settings for the import process
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidateConfig {
    /// Treat pattern failures and warnings as a failed import
    #[serde(default)]
    pub strict: bool,
    /// How to handle patterns without frames or with zero total delay
    #[serde(default)]
    pub empty_patterns: ValidationLevel,
}

/// Complete anm.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnmConfig {
    /// Project metadata
    #[serde(default)]
    pub project: ProjectConfig,
    /// Import settings
    #[serde(default)]
    pub import: ImportSettings,
    /// Validation settings
    #[serde(default)]
    pub validate: ValidateConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "import.frame_rate")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anm.toml: '{}' {}", self.field, self.message)
    }
}

impl AnmConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.project.name.is_empty() {
            errors.push(ConfigValidationError {
                field: "project.name".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        errors.extend(self.import.validate("import"));
        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

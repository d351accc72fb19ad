//! Source file discovery for the build system.

use crate::store::SOURCE_EXTENSION;
use glob::{glob_with, MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error during source discovery.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// Source directory does not exist
    #[error("Source directory '{}' does not exist", .0.display())]
    MissingSourceDir(PathBuf),
}

/// Discover every `.anm` file under `src_dir`, sorted by path.
///
/// The extension is matched case-insensitively; hidden files and
/// directories are skipped.
pub fn discover_sources(src_dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !src_dir.is_dir() {
        return Err(DiscoveryError::MissingSourceDir(src_dir.to_path_buf()));
    }

    let pattern = format!("{}/**/*.{}", Pattern::escape(&src_dir.to_string_lossy()), SOURCE_EXTENSION);
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: true,
    };
    let paths = glob_with(&pattern, options)
        .map_err(|source| DiscoveryError::InvalidPattern { pattern: pattern.clone(), source })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                let hidden = path
                    .strip_prefix(src_dir)
                    .map(|rel| rel.components().any(|c| c.as_os_str().to_string_lossy().starts_with('.')))
                    .unwrap_or(false);
                if path.is_file() && !hidden {
                    files.push(path);
                }
            }
            Err(e) => log::warn!("error reading path: {}", e),
        }
    }

    files.sort();
    Ok(files)
}

//! Build context containing configuration and state for a build.

use crate::config::AnmConfig;
use std::path::{Path, PathBuf};

/// Default number of parallel jobs (uses available parallelism).
pub fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Build context containing configuration and paths for a build operation.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: AnmConfig,
    /// Project root directory (where anm.toml is located)
    project_root: PathBuf,
    /// Number of sources imported concurrently
    jobs: usize,
}

impl BuildContext {
    pub fn new(config: AnmConfig, project_root: PathBuf) -> Self {
        Self { config, project_root, jobs: default_jobs() }
    }

    pub fn config(&self) -> &AnmConfig {
        &self.config
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Directory searched for `.anm` files (resolved against the project root).
    pub fn src_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.src).components().collect()
    }

    /// Whether strict mode is enabled.
    pub fn is_strict(&self) -> bool {
        self.config.validate.strict
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Set the number of parallel jobs (at least one).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Resolve a path relative to the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        crate::config::resolve_path(&self.project_root, path)
    }
}

//! Batch import of every source in a project.

use crate::build::{
    discover_sources, BuildContext, BuildResult, DiscoveryError, ImportPipeline, TargetResult,
};
use crate::resolve::{relative_string, FsAssetIndex, IndexError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Error that stops a build before any source is imported.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
    #[error("Cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Build pipeline importing every `.anm` file under the source directory.
///
/// Each source has its own destination, so sources are imported
/// concurrently; a single import always runs on one thread.
pub struct BuildPipeline {
    /// Build context
    context: BuildContext,
    /// Whether to stop on first error
    fail_fast: bool,
    /// Whether to do a dry run (don't actually import)
    dry_run: bool,
}

impl BuildPipeline {
    pub fn new(context: BuildContext) -> Self {
        Self { context, fail_fast: false, dry_run: false }
    }

    /// Set fail-fast mode (stop on first error, importing serially).
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set dry-run mode (list sources without importing).
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Sources the build would import.
    pub fn sources(&self) -> Result<Vec<PathBuf>, BuildError> {
        Ok(discover_sources(&self.context.src_dir())?)
    }

    /// Run the build.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let sources = self.sources()?;
        log::info!("found {} source(s) under {}", sources.len(), self.context.src_dir().display());

        let mut result = BuildResult::new();
        if self.dry_run {
            for source in &sources {
                result.add_result(TargetResult::skipped(self.target_id(source)));
            }
            return Ok(result.with_duration(start.elapsed()));
        }

        let index = FsAssetIndex::scan(self.context.project_root())?;
        let importer = ImportPipeline::from_context(&self.context);

        if self.fail_fast || self.context.jobs() == 1 {
            for source in &sources {
                let target = self.import_target(&importer, &index, source);
                let failed = target.status.is_failure();
                result.add_result(target);
                if failed && self.fail_fast {
                    break;
                }
            }
        } else {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(self.context.jobs()).build()?;
            let targets: Vec<TargetResult> = pool.install(|| {
                sources.par_iter().map(|source| self.import_target(&importer, &index, source)).collect()
            });
            for target in targets {
                result.add_result(target);
            }
        }

        Ok(result.with_duration(start.elapsed()))
    }

    fn import_target(&self, importer: &ImportPipeline, index: &FsAssetIndex, source: &Path) -> TargetResult {
        let start = Instant::now();
        let target_id = self.target_id(source);
        match importer.import_with_index(source, index) {
            Ok(report) => {
                TargetResult::from_report(target_id, &report, self.context.is_strict(), start.elapsed())
            }
            Err(e) => {
                log::error!("{}: {}", target_id, e);
                TargetResult::failed(target_id, e.to_string(), start.elapsed())
            }
        }
    }

    fn target_id(&self, source: &Path) -> String {
        source
            .strip_prefix(self.context.project_root())
            .map(relative_string)
            .unwrap_or_else(|_| source.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildStatus;
    use crate::config::default_config;
    use std::fs;
    use tempfile::TempDir;

    const SOURCE: &str = "ANIME_VERSION=1\r\nPATTERN_NAME=Walk\r\n\tFRAME_NUMBER=1\r\n\t\tFILENAME=hero.bmp\r\n\t\tWIDTH=16\r\n\t\tHEIGHT=16\r\n\t\tDELAY=100\r\n";

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("anims")).unwrap();
        image::RgbaImage::new(32, 32).save(temp.path().join("hero.png")).unwrap();
        fs::write(temp.path().join("anims/a.anm"), SOURCE).unwrap();
        fs::write(temp.path().join("anims/b.anm"), SOURCE).unwrap();
        temp
    }

    fn context(root: &Path) -> BuildContext {
        BuildContext::new(default_config(), root.to_path_buf())
    }

    #[test]
    fn test_dry_run_lists_sources() {
        let temp = project();
        let result = BuildPipeline::new(context(temp.path())).with_dry_run(true).build().unwrap();

        let ids: Vec<&str> = result.targets.iter().map(|t| t.target_id.as_str()).collect();
        assert_eq!(ids, vec!["anims/a.anm", "anims/b.anm"]);
        assert_eq!(result.skipped_count(), 2);
        assert!(!temp.path().join("anims/a.asset").exists());
    }

    #[test]
    fn test_parallel_build() {
        let temp = project();
        let result = BuildPipeline::new(context(temp.path()).with_jobs(2)).build().unwrap();

        assert!(result.is_success());
        assert_eq!(result.success_count(), 2);
        assert!(temp.path().join("anims/a.asset").exists());
        assert!(temp.path().join("anims/b.asset").exists());
    }

    #[test]
    fn test_fail_fast_stops_after_failure() {
        let temp = project();
        fs::write(temp.path().join("anims/a.anm"), "DELAY=1\n").unwrap();

        let result = BuildPipeline::new(context(temp.path())).with_fail_fast(true).build().unwrap();
        assert_eq!(result.targets.len(), 1);
        assert!(matches!(result.targets[0].status, BuildStatus::Failed(_)));
        assert!(!temp.path().join("anims/b.asset").exists());
    }

    #[test]
    fn test_failure_does_not_stop_build() {
        let temp = project();
        fs::write(temp.path().join("anims/a.anm"), "DELAY=1\n").unwrap();

        let result = BuildPipeline::new(context(temp.path()).with_jobs(1)).build().unwrap();
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.success_count(), 1);
    }

    #[test]
    fn test_missing_src_dir() {
        let temp = TempDir::new().unwrap();
        let mut config = default_config();
        config.project.src = PathBuf::from("nope");
        let err = BuildPipeline::new(BuildContext::new(config, temp.path().to_path_buf())).build().unwrap_err();
        assert!(matches!(err, BuildError::Discovery(DiscoveryError::MissingSourceDir(_))));
    }
}

//! Importing a single source into its destination container.
//!
//! An import is one transaction: the source is parsed and every pattern is
//! synthesized before the destination is touched, and the destination is
//! only written once reconciliation has succeeded. A fatal error anywhere
//! leaves the destination as it was.

use crate::build::BuildContext;
use crate::config::{ImportSettings, ValidateConfig};
use crate::models::AnimationDocument;
use crate::parser::{read_document, DocumentError};
use crate::reconcile::{reconcile, ReconcileError, ReconcileReport};
use crate::resolve::{relative_string, AssetIndex, FsAssetIndex, IndexError, TextureResolver};
use crate::store::{
    asset_path_for_source, source_path_for_asset, ArtifactStore, FileStore, SourceInfo, StoreError,
};
use crate::synth::{PatternFailure, PatternWarning, SynthError, Synthesizer};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error that aborts an import.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("'{}' is not an .anm file", .0.display())]
    NotASource(PathBuf),
    #[error("'{}' is not an .asset file", .0.display())]
    NotAnAsset(PathBuf),
    #[error("'{}' does not exist", .0.display())]
    MissingAsset(PathBuf),
    #[error("'{}' records invalid import settings: {}", path.display(), errors.join("; "))]
    InvalidSettings { path: PathBuf, errors: Vec<String> },
    #[error("'{}' is outside the project root '{}'", path.display(), root.display())]
    OutsideProject { path: PathBuf, root: PathBuf },
    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Synth(#[from] SynthError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// What importing a document did to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub reconcile: ReconcileReport,
    pub failures: Vec<PatternFailure>,
    pub warnings: Vec<PatternWarning>,
}

/// Result of importing one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub reconcile: ReconcileReport,
    pub failures: Vec<PatternFailure>,
    pub warnings: Vec<PatternWarning>,
}

impl ImportReport {
    fn new(source: PathBuf, destination: PathBuf, outcome: ImportOutcome) -> Self {
        Self {
            source,
            destination,
            reconcile: outcome.reconcile,
            failures: outcome.failures,
            warnings: outcome.warnings,
        }
    }

    /// Whether every pattern was built without warnings.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }
}

/// Imports `.anm` sources of one project.
#[derive(Debug, Clone)]
pub struct ImportPipeline {
    root: PathBuf,
    settings: ImportSettings,
    validate: ValidateConfig,
}

impl ImportPipeline {
    /// Pipeline for the project rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, settings: ImportSettings, validate: ValidateConfig) -> Self {
        Self { root: root.into(), settings, validate }
    }

    pub fn from_context(context: &BuildContext) -> Self {
        Self::new(
            context.project_root(),
            context.config().import.clone(),
            context.config().validate.clone(),
        )
    }

    /// Import `source` into the `.asset` container next to it, searching the
    /// whole project for images.
    pub fn import(&self, source: &Path) -> Result<ImportReport, ImportError> {
        let index = FsAssetIndex::scan(&self.root)?;
        self.import_with_index(source, &index)
    }

    /// Import `source` resolving images through an already built index.
    pub fn import_with_index<I: AssetIndex>(
        &self,
        source: &Path,
        index: I,
    ) -> Result<ImportReport, ImportError> {
        let destination =
            asset_path_for_source(source).ok_or_else(|| ImportError::NotASource(source.to_path_buf()))?;
        let relative = self.project_relative(source)?;
        let scope = relative.rsplit_once('/').map_or("", |(dir, _)| dir).to_string();

        let doc = read_document(source)?;
        let mut store = FileStore::open(&destination)?;
        let outcome = self.import_document(&doc, &scope, index, &mut store)?;

        store.set_source_info(SourceInfo { source: relative, settings: self.settings.clone() });
        store.save()?;

        let report = ImportReport::new(source.to_path_buf(), destination, outcome);
        log::info!(
            "imported {} -> {} ({})",
            report.source.display(),
            report.destination.display(),
            report.reconcile.summary()
        );
        Ok(report)
    }

    /// Synthesize `doc` and reconcile the result into `store`.
    ///
    /// `scope` is the project-relative directory the document lives in; image
    /// searches start there.
    pub fn import_document<I: AssetIndex, S: ArtifactStore + ?Sized>(
        &self,
        doc: &AnimationDocument,
        scope: &str,
        index: I,
        store: &mut S,
    ) -> Result<ImportOutcome, ImportError> {
        let mut resolver = TextureResolver::new(index);
        let output = Synthesizer::new(&self.settings, &self.validate).run(doc, scope, &mut resolver)?;
        let reconcile = reconcile(store, &output)?;
        Ok(ImportOutcome { reconcile, failures: output.failures, warnings: output.warnings })
    }

    /// Rebuild `asset` from the source and settings it records.
    ///
    /// A container without a record is rebuilt from the `.anm` next to it
    /// with this pipeline's settings.
    pub fn reimport(&self, asset: &Path) -> Result<ImportReport, ImportError> {
        let default_source =
            source_path_for_asset(asset).ok_or_else(|| ImportError::NotAnAsset(asset.to_path_buf()))?;
        if !asset.exists() {
            return Err(ImportError::MissingAsset(asset.to_path_buf()));
        }

        let store = FileStore::open(asset)?;
        match store.source_info() {
            Some(info) => {
                let errors = info.settings.validate("settings");
                if !errors.is_empty() {
                    return Err(ImportError::InvalidSettings {
                        path: asset.to_path_buf(),
                        errors: errors.into_iter().map(|e| e.to_string()).collect(),
                    });
                }
                let recorded = self.root.join(&info.source);
                let source = if recorded.exists() { recorded } else { default_source };
                let pipeline = Self {
                    root: self.root.clone(),
                    settings: info.settings.clone(),
                    validate: self.validate.clone(),
                };
                pipeline.import(&source)
            }
            None => self.import(&default_source),
        }
    }

    /// `/`-separated path of `path` relative to the project root.
    fn project_relative(&self, path: &Path) -> Result<String, ImportError> {
        let canonical = |p: &Path| {
            p.canonicalize().map_err(|source| ImportError::Io { path: p.to_path_buf(), source })
        };
        let root = canonical(&self.root)?;
        let path = canonical(path)?;
        match path.strip_prefix(&root) {
            Ok(relative) => Ok(relative_string(relative)),
            Err(_) => Err(ImportError::OutsideProject { path, root }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtifactKind, Frame, Pattern};
    use crate::resolve::ImageHandle;
    use crate::store::MemoryStore;
    use std::fs;
    use tempfile::TempDir;

    struct Fixed;

    impl AssetIndex for Fixed {
        fn find(&self, filter: &str, _scope: &str) -> Vec<ImageHandle> {
            if filter == "hero" {
                vec![ImageHandle::new("hero.png", 64, 32)]
            } else {
                Vec::new()
            }
        }
    }

    fn pipeline(root: &Path) -> ImportPipeline {
        ImportPipeline::new(root, ImportSettings::default(), ValidateConfig::default())
    }

    fn walk() -> AnimationDocument {
        let frame = |src_x, delay| Frame {
            filename: "hero.bmp".to_string(),
            src_x,
            width: 32,
            height: 32,
            delay,
            ..Default::default()
        };
        AnimationDocument {
            version: 1,
            patterns: vec![Pattern { name: "Walk".to_string(), frames: vec![frame(0, 100), frame(32, 150)] }],
        }
    }

    #[test]
    fn test_import_document_into_memory() {
        let mut store = MemoryStore::new();
        let outcome = pipeline(Path::new(".")).import_document(&walk(), "", Fixed, &mut store).unwrap();

        assert_eq!(outcome.reconcile.sprites.created, vec!["Walk#1", "Walk#2"]);
        assert!(outcome.failures.is_empty());
        assert_eq!(store.enumerate(ArtifactKind::Timeline).len(), 1);
    }

    #[test]
    fn test_duplicate_pattern_leaves_store_untouched() {
        let mut doc = walk();
        doc.patterns.push(doc.patterns[0].clone());
        let mut store = MemoryStore::new();

        let err = pipeline(Path::new(".")).import_document(&doc, "", Fixed, &mut store).unwrap_err();
        assert!(matches!(err, ImportError::Synth(SynthError::DuplicatePattern { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_import_rejects_wrong_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hero.txt");
        fs::write(&path, "ANIME_VERSION=1\n").unwrap();
        let err = pipeline(temp.path()).import_with_index(&path, Fixed).unwrap_err();
        assert!(matches!(err, ImportError::NotASource(_)));
    }

    #[test]
    fn test_import_outside_project() {
        let project = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let path = elsewhere.path().join("hero.anm");
        fs::write(&path, "ANIME_VERSION=1\n").unwrap();

        let err = pipeline(project.path()).import_with_index(&path, Fixed).unwrap_err();
        assert!(matches!(err, ImportError::OutsideProject { .. }));
    }

    #[test]
    fn test_parse_error_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hero.anm");
        fs::write(&path, "ANIME_VERSION=1\nDELAY=10\n").unwrap();

        let err = pipeline(temp.path()).import_with_index(&path, Fixed).unwrap_err();
        assert!(matches!(err, ImportError::Document(DocumentError::Parse { .. })));
        assert!(!temp.path().join("hero.asset").exists());
    }

    #[test]
    fn test_import_records_source_info() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("anims")).unwrap();
        let path = temp.path().join("anims/hero.anm");
        fs::write(&path, crate::fmt::write_document(&walk())).unwrap();

        let report = pipeline(temp.path()).import_with_index(&path, Fixed).unwrap();
        assert_eq!(report.destination, temp.path().join("anims/hero.asset"));
        assert!(report.is_complete());

        let store = FileStore::open(&report.destination).unwrap();
        let info = store.source_info().unwrap();
        assert_eq!(info.source, "anims/hero.anm");
        assert_eq!(info.settings, ImportSettings::default());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_reimport_requires_existing_asset() {
        let temp = TempDir::new().unwrap();
        let err = pipeline(temp.path()).reimport(&temp.path().join("hero.asset")).unwrap_err();
        assert!(matches!(err, ImportError::MissingAsset(_)));

        let err = pipeline(temp.path()).reimport(&temp.path().join("hero.anm")).unwrap_err();
        assert!(matches!(err, ImportError::NotAnAsset(_)));
    }

    #[test]
    fn test_reimport_rejects_invalid_recorded_settings() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("hero.anm");
        fs::write(&source, crate::fmt::write_document(&walk())).unwrap();
        pipeline(temp.path()).import_with_index(&source, Fixed).unwrap();

        let asset = temp.path().join("hero.asset");
        let mut store = FileStore::open(&asset).unwrap();
        let settings = ImportSettings { frame_rate: 0, pixels_per_unit: 0.0, ..Default::default() };
        store.set_source_info(SourceInfo { source: "hero.anm".to_string(), settings });
        store.save().unwrap();
        let saved = fs::read(&asset).unwrap();

        let err = pipeline(temp.path()).reimport(&asset).unwrap_err();
        match err {
            ImportError::InvalidSettings { errors, .. } => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("settings.frame_rate"));
            }
            other => panic!("expected invalid settings, got {:?}", other),
        }
        assert_eq!(fs::read(&asset).unwrap(), saved);
    }
}

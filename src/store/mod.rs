//! Destination stores for generated artifacts
//!
//! A store holds the artifacts generated from one source, addressed by
//! `(kind, name)` and identified by an [`ArtifactId`] that survives
//! [`ArtifactStore::update_in_place`]. Replacing an artifact by deleting and
//! re-creating it would hand out a new id and break anything that refers to
//! the old one, so the reconciler only ever updates in place.

mod file;
mod memory;

pub use file::{
    asset_path_for_source, source_path_for_asset, FileStore, ASSET_EXTENSION, FORMAT_VERSION,
    SOURCE_EXTENSION,
};
pub use memory::MemoryStore;

use crate::config::ImportSettings;
use crate::models::{Artifact, ArtifactId, ArtifactKey, ArtifactKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Error raised by a store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{}' is not a valid container: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("'{}' has container version {found}, expected {expected}", path.display())]
    VersionMismatch { path: PathBuf, expected: u32, found: u32 },
    #[error("no artifact with id {0}")]
    UnknownId(ArtifactId),
    #[error("artifact {id} is a {stored}, cannot replace it with a {given}")]
    KindMismatch { id: ArtifactId, stored: ArtifactKind, given: ArtifactKind },
    #[error("{0} already exists")]
    DuplicateKey(ArtifactKey),
}

/// An artifact together with its store identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArtifact {
    pub id: ArtifactId,
    pub artifact: Artifact,
}

impl StoredArtifact {
    pub fn key(&self) -> ArtifactKey {
        self.artifact.key()
    }
}

/// Where a destination's artifacts came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Project-relative path of the source file, `/`-separated
    pub source: String,
    /// Settings used for the last import
    pub settings: ImportSettings,
}

/// A `(kind, name)`-keyed artifact store with stable ids.
pub trait ArtifactStore {
    /// All artifacts of `kind`, in creation order.
    fn enumerate(&self, kind: ArtifactKind) -> Vec<StoredArtifact>;

    fn load(&self, kind: ArtifactKind, name: &str) -> Option<StoredArtifact>;

    /// Add a new artifact. Fails if its key is taken.
    fn create(&mut self, artifact: Artifact) -> Result<ArtifactId, StoreError>;

    /// Overwrite the content of `id`, keeping the id. The kind cannot change.
    fn update_in_place(&mut self, id: ArtifactId, artifact: Artifact) -> Result<(), StoreError>;

    fn delete(&mut self, id: ArtifactId) -> Result<(), StoreError>;

    /// Mark `id` as the object the container presents first.
    fn set_primary(&mut self, id: ArtifactId) -> Result<(), StoreError>;

    fn primary(&self) -> Option<ArtifactId>;

    fn source_info(&self) -> Option<&SourceInfo>;

    fn set_source_info(&mut self, info: SourceInfo);

    /// Number of artifacts of all kinds.
    fn len(&self) -> usize {
        ArtifactKind::ALL.iter().map(|&kind| self.enumerate(kind).len()).sum()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

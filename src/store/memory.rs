use super::{ArtifactStore, SourceInfo, StoreError, StoredArtifact};
use crate::models::{Artifact, ArtifactId, ArtifactKind};
use std::collections::BTreeMap;

/// In-memory [`ArtifactStore`]. Ids increase monotonically and are never
/// reused, even after deletion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    artifacts: BTreeMap<ArtifactId, Artifact>,
    next_id: u64,
    primary: Option<ArtifactId>,
    source: Option<SourceInfo>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted parts.
    pub(crate) fn from_parts(
        artifacts: Vec<StoredArtifact>,
        next_id: u64,
        primary: Option<ArtifactId>,
        source: Option<SourceInfo>,
    ) -> Self {
        let next_id = artifacts.iter().map(|a| a.id.0 + 1).fold(next_id, u64::max);
        let artifacts = artifacts.into_iter().map(|a| (a.id, a.artifact)).collect();
        Self { artifacts, next_id, primary, source }
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Every artifact in id order.
    pub fn all(&self) -> Vec<StoredArtifact> {
        self.artifacts
            .iter()
            .map(|(&id, artifact)| StoredArtifact { id, artifact: artifact.clone() })
            .collect()
    }

    pub fn get(&self, id: ArtifactId) -> Option<&Artifact> {
        self.artifacts.get(&id)
    }

    fn find_id(&self, kind: ArtifactKind, name: &str) -> Option<ArtifactId> {
        self.artifacts
            .iter()
            .find(|(_, a)| a.kind() == kind && a.name() == name)
            .map(|(&id, _)| id)
    }
}

impl ArtifactStore for MemoryStore {
    fn enumerate(&self, kind: ArtifactKind) -> Vec<StoredArtifact> {
        self.artifacts
            .iter()
            .filter(|(_, a)| a.kind() == kind)
            .map(|(&id, artifact)| StoredArtifact { id, artifact: artifact.clone() })
            .collect()
    }

    fn load(&self, kind: ArtifactKind, name: &str) -> Option<StoredArtifact> {
        let id = self.find_id(kind, name)?;
        self.artifacts.get(&id).map(|artifact| StoredArtifact { id, artifact: artifact.clone() })
    }

    fn create(&mut self, artifact: Artifact) -> Result<ArtifactId, StoreError> {
        if self.find_id(artifact.kind(), artifact.name()).is_some() {
            return Err(StoreError::DuplicateKey(artifact.key()));
        }
        let id = ArtifactId(self.next_id);
        self.next_id += 1;
        self.artifacts.insert(id, artifact);
        Ok(id)
    }

    fn update_in_place(&mut self, id: ArtifactId, artifact: Artifact) -> Result<(), StoreError> {
        let stored = self.artifacts.get(&id).ok_or(StoreError::UnknownId(id))?.kind();
        if stored != artifact.kind() {
            return Err(StoreError::KindMismatch { id, stored, given: artifact.kind() });
        }
        if let Some(other) = self.find_id(artifact.kind(), artifact.name()) {
            if other != id {
                return Err(StoreError::DuplicateKey(artifact.key()));
            }
        }
        self.artifacts.insert(id, artifact);
        Ok(())
    }

    fn delete(&mut self, id: ArtifactId) -> Result<(), StoreError> {
        self.artifacts.remove(&id).ok_or(StoreError::UnknownId(id))?;
        if self.primary == Some(id) {
            self.primary = None;
        }
        Ok(())
    }

    fn set_primary(&mut self, id: ArtifactId) -> Result<(), StoreError> {
        if !self.artifacts.contains_key(&id) {
            return Err(StoreError::UnknownId(id));
        }
        self.primary = Some(id);
        Ok(())
    }

    fn primary(&self) -> Option<ArtifactId> {
        self.primary
    }

    fn source_info(&self) -> Option<&SourceInfo> {
        self.source.as_ref()
    }

    fn set_source_info(&mut self, info: SourceInfo) {
        self.source = Some(info);
    }

    fn len(&self) -> usize {
        self.artifacts.len()
    }
}

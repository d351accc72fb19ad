//! JSON destination container
//!
//! One `.asset` file per source holds every artifact generated from it:
//!
//! ```json
//! {
//!   "version": 1,
//!   "created_at": "2026-01-15T10:30:00Z",
//!   "updated_at": "2026-01-15T10:35:00Z",
//!   "source": { "source": "Anims/hero.anm", "settings": { ... } },
//!   "next_id": 4,
//!   "primary": 3,
//!   "artifacts": [ { "id": 0, "artifact": { "kind": "sprite", ... } } ]
//! }
//! ```

use super::{ArtifactStore, MemoryStore, SourceInfo, StoreError, StoredArtifact};
use crate::models::{Artifact, ArtifactId, ArtifactKind};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Current container format version.
pub const FORMAT_VERSION: u32 = 1;

/// Extension of source files.
pub const SOURCE_EXTENSION: &str = "anm";

/// Extension of destination containers.
pub const ASSET_EXTENSION: &str = "asset";

/// Destination container for `source` (`x.anm` → `x.asset`).
///
/// `None` if `source` does not have the `.anm` extension.
pub fn asset_path_for_source(source: &Path) -> Option<PathBuf> {
    swap_extension(source, SOURCE_EXTENSION, ASSET_EXTENSION)
}

/// Source file a destination container was generated from by default.
pub fn source_path_for_asset(asset: &Path) -> Option<PathBuf> {
    swap_extension(asset, ASSET_EXTENSION, SOURCE_EXTENSION)
}

fn swap_extension(path: &Path, from: &str, to: &str) -> Option<PathBuf> {
    let ext = path.extension()?.to_str()?;
    if ext.eq_ignore_ascii_case(from) {
        Some(path.with_extension(to))
    } else {
        None
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Container {
    version: u32,
    created_at: String,
    updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<SourceInfo>,
    next_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    primary: Option<ArtifactId>,
    #[serde(default)]
    artifacts: Vec<StoredArtifact>,
}

/// [`ArtifactStore`] persisted as a JSON container file.
///
/// Changes are kept in memory until [`FileStore::save`].
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    created_at: String,
    updated_at: String,
    inner: MemoryStore,
}

impl FileStore {
    /// Load the container at `path`, or start an empty one if it does not exist.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            let now = format_timestamp(SystemTime::now());
            return Ok(Self {
                path: path.to_path_buf(),
                created_at: now.clone(),
                updated_at: now,
                inner: MemoryStore::new(),
            });
        }

        let file = File::open(path).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        let container: Container = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;

        if container.version != FORMAT_VERSION {
            return Err(StoreError::VersionMismatch {
                path: path.to_path_buf(),
                expected: FORMAT_VERSION,
                found: container.version,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            created_at: container.created_at,
            updated_at: container.updated_at,
            inner: MemoryStore::from_parts(
                container.artifacts,
                container.next_id,
                container.primary,
                container.source,
            ),
        })
    }

    /// Write the container to its path, creating parent directories.
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.updated_at = format_timestamp(SystemTime::now());

        let io_err = |source| StoreError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let container = Container {
            version: FORMAT_VERSION,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
            source: self.inner.source_info().cloned(),
            next_id: self.inner.next_id(),
            primary: self.inner.primary(),
            artifacts: self.inner.all(),
        };

        let file = File::create(&self.path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &container)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        log::debug!("saved {} artifacts to {}", self.inner.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    /// Every artifact in id order.
    pub fn all(&self) -> Vec<StoredArtifact> {
        self.inner.all()
    }
}

impl ArtifactStore for FileStore {
    fn enumerate(&self, kind: ArtifactKind) -> Vec<StoredArtifact> {
        self.inner.enumerate(kind)
    }

    fn load(&self, kind: ArtifactKind, name: &str) -> Option<StoredArtifact> {
        self.inner.load(kind, name)
    }

    fn create(&mut self, artifact: Artifact) -> Result<ArtifactId, StoreError> {
        self.inner.create(artifact)
    }

    fn update_in_place(&mut self, id: ArtifactId, artifact: Artifact) -> Result<(), StoreError> {
        self.inner.update_in_place(id, artifact)
    }

    fn delete(&mut self, id: ArtifactId) -> Result<(), StoreError> {
        self.inner.delete(id)
    }

    fn set_primary(&mut self, id: ArtifactId) -> Result<(), StoreError> {
        self.inner.set_primary(id)
    }

    fn primary(&self) -> Option<ArtifactId> {
        self.inner.primary()
    }

    fn source_info(&self) -> Option<&SourceInfo> {
        self.inner.source_info()
    }

    fn set_source_info(&mut self, info: SourceInfo) {
        self.inner.set_source_info(info)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// RFC 3339 UTC timestamp with second precision.
fn format_timestamp(time: SystemTime) -> String {
    let secs = time.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_secs();
    let (days, rem) = ((secs / 86_400) as i64, secs % 86_400);
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Proleptic Gregorian date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportSettings;
    use crate::models::GeneratedTimeline;
    use std::time::Duration;
    use tempfile::TempDir;

    fn timeline(name: &str) -> Artifact {
        Artifact::from(GeneratedTimeline {
            name: name.to_string(),
            frame_rate: 60,
            loop_time: true,
            duration: 0.25,
            keyframes: Vec::new(),
        })
    }

    #[test]
    fn test_path_mapping() {
        assert_eq!(asset_path_for_source(Path::new("a/hero.anm")), Some(PathBuf::from("a/hero.asset")));
        assert_eq!(asset_path_for_source(Path::new("a/hero.ANM")), Some(PathBuf::from("a/hero.asset")));
        assert_eq!(asset_path_for_source(Path::new("a/hero.png")), None);
        assert_eq!(asset_path_for_source(Path::new("a/hero")), None);
        assert_eq!(source_path_for_asset(Path::new("a/hero.asset")), Some(PathBuf::from("a/hero.anm")));
    }

    #[test]
    fn test_open_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(&temp.path().join("hero.asset")).unwrap();
        assert!(store.is_empty());
        assert!(store.source_info().is_none());
    }

    #[test]
    fn test_save_and_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("hero.asset");

        let mut store = FileStore::open(&path).unwrap();
        let walk = store.create(timeline("Walk")).unwrap();
        let run = store.create(timeline("Run")).unwrap();
        store.delete(run).unwrap();
        store.set_primary(walk).unwrap();
        store.set_source_info(SourceInfo { source: "hero.anm".to_string(), settings: ImportSettings::default() });
        store.save().unwrap();

        let mut reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.primary(), Some(walk));
        assert_eq!(reopened.load(ArtifactKind::Timeline, "Walk").unwrap().artifact, timeline("Walk"));
        assert_eq!(reopened.source_info().unwrap().source, "hero.anm");
        assert_eq!(reopened.created_at(), store.created_at());

        // the deleted id stays retired
        let next = reopened.create(timeline("Jump")).unwrap();
        assert!(next > run);
    }

    #[test]
    fn test_version_mismatch() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hero.asset");
        fs::write(
            &path,
            r#"{"version": 99, "created_at": "", "updated_at": "", "next_id": 0, "artifacts": []}"#,
        )
        .unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::VersionMismatch { found: 99, expected: FORMAT_VERSION, .. }));
    }

    #[test]
    fn test_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hero.asset");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_container_json_layout() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hero.asset");
        let mut store = FileStore::open(&path).unwrap();
        store.create(timeline("Walk")).unwrap();
        store.save().unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["version"], FORMAT_VERSION);
        assert_eq!(json["artifacts"][0]["id"], 0);
        assert_eq!(json["artifacts"][0]["artifact"]["kind"], "timeline");
        assert_eq!(json["artifacts"][0]["artifact"]["name"], "Walk");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(SystemTime::UNIX_EPOCH), "1970-01-01T00:00:00Z");
        let leap_day = SystemTime::UNIX_EPOCH + Duration::from_secs(951_782_400 + 3_661);
        assert_eq!(format_timestamp(leap_day), "2000-02-29T01:01:01Z");
    }
}

//! Texture resolution
//!
//! Frames name their image with a path relative to wherever the authoring
//! tool kept it, which rarely matches the project layout. The resolver treats
//! that path as a hint: it searches the source file's directory for the full
//! hint, drops leading directories from the hint until something matches, and
//! then widens the search one parent directory at a time up to the project
//! root.

use glob::{glob_with, MatchOptions, Pattern};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Image file extensions picked up by [`FsAssetIndex`].
pub const IMAGE_EXTENSIONS: &[&str] =
    &["png", "bmp", "gif", "jpg", "jpeg", "tga", "tif", "tiff", "webp"];

/// A located source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    /// Project-relative path, `/`-separated
    pub path: String,
    pub width: u32,
    pub height: u32,
}

impl ImageHandle {
    pub fn new(path: impl Into<String>, width: u32, height: u32) -> Self {
        Self { path: path.into(), width, height }
    }
}

/// Search index over the images of a project.
pub trait AssetIndex {
    /// Images under `scope` (project-relative directory, `""` for the root)
    /// matching `filter`, best match first.
    fn find(&self, filter: &str, scope: &str) -> Vec<ImageHandle>;
}

impl<T: AssetIndex + ?Sized> AssetIndex for &T {
    fn find(&self, filter: &str, scope: &str) -> Vec<ImageHandle> {
        (**self).find(filter, scope)
    }
}

/// Turn an image reference into a search filter: forward slashes, no
/// extension on the last segment.
pub fn normalize_reference(reference: &str) -> String {
    let unified = reference.trim().replace('\\', "/");
    let (dir, file) = match unified.rfind('/') {
        Some(i) => unified.split_at(i + 1),
        None => ("", unified.as_str()),
    };
    let stem = match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file,
    };
    format!("{}{}", dir, stem)
}

/// Drop the leading segment of a filter. `None` once only a file name is left.
pub fn narrow(filter: &str) -> Option<&str> {
    filter.split_once('/').map(|(_, rest)| rest)
}

/// Parent directory of a scope. `None` at the project root.
pub fn broaden(scope: &str) -> Option<&str> {
    if scope.is_empty() {
        return None;
    }
    Some(scope.rfind('/').map_or("", |i| &scope[..i]))
}

fn normalize_scope(scope: &str) -> String {
    scope.replace('\\', "/").trim_matches('/').to_string()
}

/// Resolves frame image references through an [`AssetIndex`].
///
/// Results are cached by reference string, including misses, so each distinct
/// reference costs one search per import.
pub struct TextureResolver<I> {
    index: I,
    cache: HashMap<String, Option<ImageHandle>>,
}

impl<I: AssetIndex> TextureResolver<I> {
    pub fn new(index: I) -> Self {
        Self { index, cache: HashMap::new() }
    }

    /// Locate the image for `reference`, starting the search in `scope`.
    pub fn resolve(&mut self, reference: &str, scope: &str) -> Option<ImageHandle> {
        if let Some(cached) = self.cache.get(reference) {
            return cached.clone();
        }
        let found = self.search(reference, &normalize_scope(scope));
        match &found {
            Some(handle) => log::debug!("resolved '{}' to {}", reference, handle.path),
            None => log::debug!("could not resolve '{}'", reference),
        }
        self.cache.insert(reference.to_string(), found.clone());
        found
    }

    fn search(&self, reference: &str, scope: &str) -> Option<ImageHandle> {
        let normalized = normalize_reference(reference);
        if normalized.rsplit('/').next().map_or(true, str::is_empty) {
            return None;
        }

        let mut filter = normalized.as_str();
        let mut scope = scope;
        loop {
            log::debug!("searching '{}' in '{}'", filter, scope);
            if let Some(hit) = self.index.find(filter, scope).into_iter().next() {
                return Some(hit);
            }
            if let Some(narrowed) = narrow(filter) {
                filter = narrowed;
                continue;
            }
            scope = broaden(scope)?;
        }
    }

    /// Number of distinct references looked up so far.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// Error while scanning a project for images.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IndexError {
    #[error("invalid scan pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("project root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone)]
struct IndexedImage {
    handle: ImageHandle,
    stem: String,
    dirs: Vec<String>,
}

/// [`AssetIndex`] over the image files of a directory tree.
///
/// The tree is scanned once; hidden files and directories are skipped, as are
/// images whose header cannot be read.
#[derive(Debug, Clone)]
pub struct FsAssetIndex {
    images: Vec<IndexedImage>,
}

impl FsAssetIndex {
    pub fn scan(root: &Path) -> Result<Self, IndexError> {
        if !root.is_dir() {
            return Err(IndexError::NotADirectory(root.to_path_buf()));
        }

        let pattern = format!("{}/**/*", Pattern::escape(&root.to_string_lossy()));
        let options = MatchOptions { require_literal_leading_dot: true, ..MatchOptions::new() };
        let paths = glob_with(&pattern, options)
            .map_err(|source| IndexError::Pattern { pattern: pattern.clone(), source })?;

        let mut images = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::debug!("skipping unreadable path: {}", e);
                    continue;
                }
            };
            if !path.is_file() || !is_image_file(&path) {
                continue;
            }
            let (width, height) = match image::image_dimensions(&path) {
                Ok(dims) => dims,
                Err(e) => {
                    log::debug!("skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            if relative.components().any(|c| c.as_os_str().to_string_lossy().starts_with('.')) {
                continue;
            }
            let rel = relative_string(relative);
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            let mut dirs: Vec<String> = rel.split('/').map(str::to_lowercase).collect();
            dirs.pop();
            images.push(IndexedImage { handle: ImageHandle::new(rel, width, height), stem, dirs });
        }

        images.sort_by(|a, b| a.handle.path.cmp(&b.handle.path));
        log::debug!("indexed {} images under {}", images.len(), root.display());
        Ok(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl AssetIndex for FsAssetIndex {
    fn find(&self, filter: &str, scope: &str) -> Vec<ImageHandle> {
        let filter = filter.to_lowercase();
        let mut segments: Vec<&str> = filter.split('/').collect();
        let name = segments.pop().unwrap_or_default();
        if name.is_empty() {
            return Vec::new();
        }

        let prefix = if scope.is_empty() { String::new() } else { format!("{}/", scope) };
        let mut matches: Vec<&IndexedImage> = self
            .images
            .iter()
            .filter(|image| image.handle.path.starts_with(&prefix))
            .filter(|image| image.stem.contains(name))
            .filter(|image| {
                image.dirs.len() >= segments.len()
                    && image.dirs[image.dirs.len() - segments.len()..]
                        .iter()
                        .zip(&segments)
                        .all(|(dir, segment)| dir.as_str() == *segment)
            })
            .collect();

        // Images are already sorted by path; a stable sort keeps that order
        // within each group.
        matches.sort_by_key(|image| image.stem != name);
        matches.into_iter().map(|image| image.handle.clone()).collect()
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Project-relative `/`-separated form of a relative path.
pub fn relative_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

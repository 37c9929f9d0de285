//! Image Scanner
//!
//! Walks an image root lazily and yields every regular file whose name has an
//! image extension. Unreadable directories and a missing root contribute no
//! files instead of failing the walk.

use std::path::PathBuf;
use walkdir::WalkDir;

/// Extensions accepted as images (compared lowercased)
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// A discovered image file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageFile {
    pub path: PathBuf,
    pub name: String,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, name }
    }
}

/// Returns true if the lowercased file name ends with an accepted extension
pub fn is_image_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    match lower.rsplit_once('.') {
        Some((_, ext)) => IMAGE_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Recursive image scanner rooted at one directory
///
/// Symbolic links are followed. Link loops and dangling links surface as
/// walk errors and are skipped like unreadable directories.
#[derive(Debug, Clone)]
pub struct ImageScanner {
    root: PathBuf,
}

impl ImageScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Start a fresh walk. Each call restarts from the root.
    pub fn scan(&self) -> impl Iterator<Item = ImageFile> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("[Scanner] Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_image_name(&entry.file_name().to_string_lossy()))
            .map(|entry| ImageFile::new(entry.into_path()))
    }
}

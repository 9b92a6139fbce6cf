use walkdir::WalkDir;
use std::path::{Path, PathBuf};
use crate::error::{Result, NotegraphError};
use super::metadata::normalize_relative_path;

/// A discovered Markdown file
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Path relative to the notes root, always `/`-separated
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub file_size: u64,
}

/// Discover all Markdown files under `root`.
///
/// Recursively walks the tree (following symlinks) and keeps files with a
/// `.md` extension, case-insensitive. The result is sorted by relative path so
/// that surrogate ids come out the same on every run.
///
/// A missing or non-directory root, and any directory that cannot be read,
/// is an error rather than an empty corpus.
pub fn discover_files(root: &Path) -> Result<Vec<FileMetadata>> {
    let root_meta = std::fs::metadata(root).map_err(|e| {
        NotegraphError::Io(std::io::Error::new(
            e.kind(),
            format!("notes root {}: {}", root.display(), e),
        ))
    })?;
    if !root_meta.is_dir() {
        return Err(NotegraphError::InvalidInput(format!(
            "notes root is not a directory: {}",
            root.display()
        )));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }

        let is_markdown = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("md"))
            .unwrap_or(false);
        if !is_markdown {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .map_err(|_| NotegraphError::Config(
                format!("Failed to compute relative path for: {}", path.display())
            ))?;

        files.push(FileMetadata {
            relative_path: normalize_relative_path(&relative.to_string_lossy()),
            absolute_path: path.to_path_buf(),
            file_size: entry.metadata()?.len(),
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    log::info!("Discovered {} Markdown files in {}", files.len(), root.display());
    Ok(files)
}

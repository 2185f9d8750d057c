//! Markdown folder document source.
//!
//! Lists article files directly inside one folder (no recursion), filtered by
//! extension and sorted by file name.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::BlogsyncError;
use crate::sources::{Document, DocumentSource};

/// Document source for a flat folder of markdown articles.
pub struct MarkdownFolderSource {
    folder_path: PathBuf,
    extensions: Vec<String>,
}

impl MarkdownFolderSource {
    pub fn new(folder_path: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        let folder_path = expand_home(folder_path.into());
        let folder_path = folder_path
            .canonicalize()
            .unwrap_or_else(|_| folder_path.clone());

        Self {
            folder_path,
            extensions,
        }
    }
}

impl DocumentSource for MarkdownFolderSource {
    fn root_path(&self) -> &Path {
        &self.folder_path
    }

    fn list_documents(&self) -> Result<Vec<PathBuf>, BlogsyncError> {
        // Surface a missing or unreadable folder instead of an empty batch
        std::fs::read_dir(&self.folder_path).map_err(|e| {
            BlogsyncError::Source(format!(
                "Cannot read {}: {e}",
                self.folder_path.display()
            ))
        })?;

        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for ext in &self.extensions {
            let pattern = format!(
                "{}/*{ext}",
                glob::Pattern::escape(&self.folder_path.to_string_lossy())
            );

            let entries = glob::glob(&pattern).map_err(|e| {
                BlogsyncError::Source(format!("Bad document pattern {pattern}: {e}"))
            })?;

            for entry in entries.flatten() {
                if !entry.is_file() {
                    continue;
                }

                let rel = match entry.strip_prefix(&self.folder_path) {
                    Ok(r) => r.to_path_buf(),
                    Err(_) => continue,
                };

                // Skip hidden files
                if rel
                    .to_str()
                    .is_some_and(|s| s.starts_with('.'))
                {
                    continue;
                }

                if seen.insert(rel.clone()) {
                    results.push(rel);
                }
            }
        }

        results.sort();
        Ok(results)
    }

    fn read_document(&self, path: &Path) -> Result<Document, BlogsyncError> {
        let full_path = self.folder_path.join(path);

        if !full_path.exists() {
            return Err(BlogsyncError::Source(format!(
                "Document not found: {}",
                path.display()
            )));
        }

        Ok(Document {
            path: path.to_path_buf(),
            raw_text: read_lossy(&full_path)?,
        })
    }
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: PathBuf) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path,
    }
}

/// Read a file as UTF-8, replacing invalid bytes with the Unicode replacement character.
fn read_lossy(path: &Path) -> Result<String, BlogsyncError> {
    let bytes = std::fs::read(path).map_err(|e| {
        BlogsyncError::Source(format!("Failed to read {}: {e}", path.display()))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

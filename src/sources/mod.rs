//! Document source abstraction.
//!
//! Defines the `DocumentSource` trait and the `Document` struct handed to the
//! ingestion pipeline.

pub mod markdown;

use std::path::{Path, PathBuf};

use crate::error::BlogsyncError;

/// Raw document as read from a source.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path to the document (relative to source root).
    pub path: PathBuf,
    /// Full file text, frontmatter included.
    pub raw_text: String,
}

impl Document {
    /// File name for reports and slug-map lookups.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// Where articles come from.
pub trait DocumentSource {
    /// Base path for this source.
    fn root_path(&self) -> &Path;

    /// List documents in ascending file-name order.
    ///
    /// Returns paths relative to `root_path()`. Fails when the source cannot
    /// be enumerated at all.
    fn list_documents(&self) -> Result<Vec<PathBuf>, BlogsyncError>;

    /// Read a document. `path` is relative to `root_path()`.
    fn read_document(&self, path: &Path) -> Result<Document, BlogsyncError>;
}

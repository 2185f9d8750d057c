//! Frontmatter parsing for blog article files.
//!
//! Articles start with a `---` delimited header of `key: value` lines,
//! followed by the body:
//!
//! ```text
//! ---
//! title: Understanding Solar Energy
//! author: Jane Doe
//! ---
//! # Body markdown...
//! ```
//!
//! Parsing is pure: callers hand in text they have already read.

use thiserror::Error;

/// Frontmatter delimiter.
pub const DELIMITER: &str = "---";

/// Recognized frontmatter fields. Missing keys stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub read_time: String,
    pub category: String,
    pub image: String,
}

impl Metadata {
    /// Assign a single `key: value` pair. Unknown keys are ignored.
    fn set(&mut self, key: &str, value: &str) {
        let slot = match key {
            "title" => &mut self.title,
            "excerpt" => &mut self.excerpt,
            "author" => &mut self.author,
            "read_time" => &mut self.read_time,
            "category" => &mut self.category,
            "image" => &mut self.image,
            _ => return,
        };
        *slot = value.to_string();
    }
}

/// A document split into its metadata and trimmed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub metadata: Metadata,
    pub body: String,
}

/// Why a document could not be split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The delimiter occurs fewer than two times.
    #[error("expected two '---' frontmatter delimiters, found {found}")]
    MissingDelimiter { found: usize },
}

/// Split `raw_text` into frontmatter metadata and body.
///
/// Text before the first delimiter is discarded. Everything after the
/// second delimiter is the body, including any further `---` it contains.
pub fn parse_document(raw_text: &str) -> Result<ParsedDocument, ParseError> {
    let parts: Vec<&str> = raw_text.splitn(3, DELIMITER).collect();
    if parts.len() < 3 {
        return Err(ParseError::MissingDelimiter {
            found: parts.len() - 1,
        });
    }

    Ok(ParsedDocument {
        metadata: parse_metadata(parts[1]),
        body: parts[2].trim().to_string(),
    })
}

/// Parse `key: value` lines. Lines without a colon are skipped; a repeated
/// key keeps its last value.
fn parse_metadata(block: &str) -> Metadata {
    let mut metadata = Metadata::default();
    for line in block.trim().lines() {
        if let Some((key, value)) = line.split_once(':') {
            metadata.set(key.trim(), value.trim());
        }
    }
    metadata
}

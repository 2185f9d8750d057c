//! URL slug derivation.

use std::sync::LazyLock;

use regex::Regex;

// Letters, numbers (including `²` and `½`) and `_`. Combining marks are
// dropped, so a decomposed `é` slugs like a bare `e`.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_\s-]").expect("static slug pattern"));

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("static slug pattern"));

/// Convert a title into a URL-safe slug.
///
/// Lower-cases, drops anything that is not a letter, number, underscore,
/// whitespace or hyphen, collapses separator runs into one `-` and trims
/// hyphens at the ends. An empty title gives an empty slug.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let cleaned = DISALLOWED.replace_all(&lower, "");
    let hyphenated = SEPARATORS.replace_all(&cleaned, "-");
    hyphenated.trim_matches('-').to_string()
}

//! Small text helpers shared by the extractor, classifier and dataset builders.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;

/// Collapse every whitespace run (newlines included) into one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True if any of `terms` occurs in `text` as a plain substring.
/// Callers lower-case both sides.
pub fn contains_any<S: AsRef<str>>(text: &str, terms: &[S]) -> bool {
    terms.iter().any(|t| text.contains(t.as_ref()))
}

/// Truncate to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// First plausible publication year (1900–2099) in a free-text year field.
pub fn first_year(text: &str) -> Option<i32> {
    year_regex()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(19\d{2}|20\d{2})").unwrap())
}

/// Write `contents` to `path`, creating missing parent directories.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    create_parent_dirs(path)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn create_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

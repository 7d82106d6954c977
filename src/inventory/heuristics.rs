//! Column Heuristics
//!
//! The package table has no schema; columns are recovered by guessing.
//! Every guess lives here so format drift can be fixed in one place.

use crate::constants::{source, table};

/// Check whether a field looks like a source tag rather than a version
///
/// Case-insensitive substring match against the known tags.
pub fn matches_source_tag(field: &str) -> Option<&'static str> {
    let lower = field.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    source::KNOWN
        .iter()
        .copied()
        .find(|tag| lower.contains(tag))
}

/// First field in `fields` that names a known source
pub fn find_source_tag<'a, I>(fields: I) -> Option<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    fields.into_iter().find_map(matches_source_tag)
}

/// Check whether a line is the table header
///
/// The trimmed line must start with the name label and mention the id and
/// version labels somewhere after it.
pub fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(table::NAME_LABEL) else {
        return false;
    };
    rest.contains(table::ID_LABEL) && rest.contains(table::VERSION_LABEL)
}

/// Check whether a line is a horizontal rule under the header
pub fn is_separator_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.starts_with("--") {
        return true;
    }
    trimmed.chars().count() >= 2 && trimmed.chars().all(|c| matches!(c, '-' | '─' | '━' | '='))
}

//! Report Index
//!
//! In-memory mapping from package key to the newest persisted report.

use chrono::NaiveDateTime;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::constants::report as report_constants;
use crate::types::SafeKey;

/// One indexed report file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportIndexEntry {
    /// Sanitized package key
    pub key: String,
    /// Absolute path of the report file
    pub path: PathBuf,
    /// Timestamp embedded in the file name
    pub timestamp: NaiveDateTime,
}

/// Split a report file stem into its key and timestamp
///
/// The key is everything before the last separator; the remainder must parse
/// as a report timestamp.
pub fn parse_file_stem(stem: &str) -> Option<(SafeKey, NaiveDateTime)> {
    let (key, suffix) = stem.rsplit_once(report_constants::KEY_SEPARATOR)?;
    if key.is_empty() {
        return None;
    }
    let timestamp = NaiveDateTime::parse_from_str(suffix, report_constants::TIMESTAMP_FORMAT).ok()?;
    Some((SafeKey::from_file_stem(key), timestamp))
}

/// Thread-safe key → report map, at most one entry per key
#[derive(Debug, Default)]
pub struct ReportIndex {
    entries: DashMap<String, ReportIndexEntry>,
}

impl ReportIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly saved report, replacing any previous mapping
    pub fn insert(&self, entry: ReportIndexEntry) -> Option<ReportIndexEntry> {
        self.entries.insert(entry.key.clone(), entry)
    }

    /// Record a rediscovered report unless a newer one is already indexed
    pub fn insert_if_newer(&self, entry: ReportIndexEntry) -> bool {
        let mut slot = self
            .entries
            .entry(entry.key.clone())
            .or_insert_with(|| entry.clone());
        if slot.timestamp < entry.timestamp
            || (slot.timestamp == entry.timestamp && slot.path < entry.path)
        {
            *slot = entry;
            return true;
        }
        slot.path == entry.path
    }

    /// Look up by package key, sanitizing it the same way file names are
    pub fn get(&self, key: &str) -> Option<ReportIndexEntry> {
        self.entries
            .get(SafeKey::new(key).as_str())
            .map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// All entries sorted by key
    pub fn entries(&self) -> Vec<ReportIndexEntry> {
        let mut entries: Vec<_> = self.entries.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    /// Key → path mapping, ordered for comparison
    pub fn snapshot(&self) -> BTreeMap<String, PathBuf> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().path.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, report_constants::TIMESTAMP_FORMAT).unwrap()
    }

    fn entry(key: &str, path: &str, stamp: &str) -> ReportIndexEntry {
        ReportIndexEntry {
            key: key.to_string(),
            path: PathBuf::from(path),
            timestamp: ts(stamp),
        }
    }

    #[test]
    fn test_parse_file_stem() {
        let (key, stamp) = parse_file_stem("Mozilla_Firefox_20240501-101500-123").unwrap();
        assert_eq!(key.as_str(), "Mozilla_Firefox");
        assert_eq!(stamp, ts("20240501-101500-123"));

        assert!(parse_file_stem("notes").is_none());
        assert!(parse_file_stem("draft_final").is_none());
        assert!(parse_file_stem("_20240501-101500-123").is_none());
    }

    #[test]
    fn test_insert_replaces_mapping() {
        let index = ReportIndex::new();
        assert!(index.insert(entry("Git", "/r/Git_a.md", "20240101-000000-000")).is_none());
        let previous = index.insert(entry("Git", "/r/Git_b.md", "20230101-000000-000"));
        assert_eq!(previous.unwrap().path, PathBuf::from("/r/Git_a.md"));
        assert_eq!(index.get("Git").unwrap().path, PathBuf::from("/r/Git_b.md"));
    }

    #[test]
    fn test_insert_if_newer_is_order_independent() {
        let old = entry("Git", "/r/old.md", "20240101-000000-000");
        let new = entry("Git", "/r/new.md", "20240102-000000-000");

        let forward = ReportIndex::new();
        forward.insert_if_newer(old.clone());
        forward.insert_if_newer(new.clone());

        let backward = ReportIndex::new();
        backward.insert_if_newer(new);
        backward.insert_if_newer(old);

        assert_eq!(forward.snapshot(), backward.snapshot());
        assert_eq!(forward.get("Git").unwrap().path, PathBuf::from("/r/new.md"));
    }

    #[test]
    fn test_get_sanitizes_key() {
        let index = ReportIndex::new();
        index.insert(entry("Mozilla_Firefox", "/r/f.md", "20240101-000000-000"));
        assert!(index.get("Mozilla Firefox").is_some());
        assert!(index.get("Chrome").is_none());
    }
}

//! Report Persistence
//!
//! Splits combined batch reports into per-package files and keeps an index of
//! the newest report for each package.
//!
//! File layout: `<reports_dir>/<safe key>_<YYYYMMDD-HHMMSS-mmm>.md`. Saving a
//! new report never touches older files; they just drop out of the index.

pub mod document;
pub mod index;
pub mod splitter;

pub use document::{AnalysisDocument, assemble, section_marker};
pub use index::{ReportIndex, ReportIndexEntry, parse_file_stem};
pub use splitter::split;

use chrono::{NaiveDateTime, TimeDelta, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::report as report_constants;
use crate::types::{PkgError, Result, ResultExt, SafeKey};

/// Reports directory plus its in-memory index
#[derive(Debug)]
pub struct ReportStore {
    dir: PathBuf,
    index: ReportIndex,
}

impl ReportStore {
    /// Open a store over `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let dir = std::path::absolute(&dir).unwrap_or(dir);
        Self {
            dir,
            index: ReportIndex::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index(&self) -> &ReportIndex {
        &self.index
    }

    /// Write one document and index it under its key
    pub async fn persist(&self, document: &AnalysisDocument) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_path(&self.dir)?;

        // UTC stamps keep file order monotonic across DST changes
        let key = SafeKey::new(&document.key);
        let (path, timestamp) = self.unique_path(&key, Utc::now().naive_utc());

        tokio::fs::write(&path, document.render())
            .await
            .with_path(&path)?;

        if let Some(previous) = self.index.insert(ReportIndexEntry {
            key: key.into_inner(),
            path: path.clone(),
            timestamp,
        }) {
            debug!("Superseded report {}", previous.path.display());
        }

        info!("Saved report {}", path.display());
        Ok(path)
    }

    /// Split a combined report and persist every section
    ///
    /// A failed write is logged and the remaining sections are still saved.
    pub async fn persist_combined(
        &self,
        combined: &str,
        known: &[crate::types::PackageRecord],
    ) -> Vec<(String, Result<PathBuf>)> {
        let mut saved = Vec::new();
        for document in split(combined, known) {
            let outcome = self.persist(&document).await;
            if let Err(e) = &outcome {
                warn!("Failed to save report for {}: {}", document.key, e);
            }
            saved.push((document.key, outcome));
        }
        saved
    }

    /// Rebuild the index from the files on disk
    ///
    /// Files whose names do not carry a report timestamp are ignored. When
    /// several files share a key, the newest embedded timestamp wins.
    /// An unreadable directory leaves the index empty.
    pub fn reload(&self) -> usize {
        self.index.clear();

        if !self.dir.is_dir() {
            debug!("Reports directory {} does not exist", self.dir.display());
            return 0;
        }

        let escaped = glob::Pattern::escape(&self.dir.to_string_lossy());
        let pattern = Path::new(&escaped)
            .join(format!("*.{}", report_constants::EXTENSION))
            .to_string_lossy()
            .into_owned();

        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Cannot scan reports directory {}: {}", self.dir.display(), e);
                return 0;
            }
        };

        for path in paths {
            let path = match path {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable report entry: {}", e);
                    continue;
                }
            };
            let Some((key, timestamp)) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(parse_file_stem)
            else {
                debug!("Ignoring {}", path.display());
                continue;
            };
            self.index.insert_if_newer(ReportIndexEntry {
                key: key.into_inner(),
                path,
                timestamp,
            });
        }

        info!(
            "Indexed {} reports from {}",
            self.index.len(),
            self.dir.display()
        );
        self.index.len()
    }

    /// Read the newest report for a package key
    pub async fn load(&self, key: &str) -> Result<String> {
        let entry = self
            .index
            .get(key)
            .ok_or_else(|| PkgError::PackageNotFound(key.to_string()))?;
        tokio::fs::read_to_string(&entry.path)
            .await
            .with_path(&entry.path)
    }

    /// First free file name for `key`, bumping the timestamp on collision
    fn unique_path(&self, key: &SafeKey, mut timestamp: NaiveDateTime) -> (PathBuf, NaiveDateTime) {
        loop {
            let path = self.dir.join(file_name(key, &timestamp));
            if !path.exists() {
                return (path, timestamp);
            }
            timestamp += TimeDelta::milliseconds(1);
        }
    }
}

/// File name for a report saved at `timestamp`
pub fn file_name(key: &SafeKey, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}{}{}.{}",
        key,
        report_constants::KEY_SEPARATOR,
        timestamp.format(report_constants::TIMESTAMP_FORMAT),
        report_constants::EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::ResearchResult;
    use chrono::Local;
    use crate::types::PackageRecord;
    use tempfile::TempDir;

    fn package(name: &str, id: &str) -> PackageRecord {
        PackageRecord::new(name, id, "1.0").with_available("2.0")
    }

    #[test]
    fn test_file_name_round_trips_through_parser() {
        let stamp = NaiveDateTime::parse_from_str("20240501-101500-042", report_constants::TIMESTAMP_FORMAT)
            .unwrap();
        let name = file_name(&SafeKey::new("Mozilla Firefox"), &stamp);
        assert_eq!(name, "Mozilla_Firefox_20240501-101500-042.md");

        let stem = name.trim_end_matches(".md");
        let (key, parsed) = parse_file_stem(stem).unwrap();
        assert_eq!(key.as_str(), "Mozilla_Firefox");
        assert_eq!(parsed, stamp);
    }

    #[tokio::test]
    async fn test_persist_writes_header_and_indexes() {
        let tmp = TempDir::new().unwrap();
        let store = ReportStore::new(tmp.path().join("reports"));

        let doc = AnalysisDocument::new("7-Zip", "## Package: 7-Zip\n\nLow risk.\n");
        let path = store.persist(&doc).await.unwrap();

        assert!(path.is_absolute());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(report_constants::HEADER_TITLE));
        assert!(text.contains("## Package: 7-Zip"));
        assert_eq!(store.index().get("7-Zip").unwrap().path, path);
        assert_eq!(store.load("7-Zip").await.unwrap(), text);
    }

    #[tokio::test]
    async fn test_persist_stamps_file_names_in_utc() {
        let tmp = TempDir::new().unwrap();
        let store = ReportStore::new(tmp.path());

        let before = Utc::now().naive_utc();
        store
            .persist(&AnalysisDocument::new("Git", "## Package: Git\n\nok\n"))
            .await
            .unwrap();
        let after = Utc::now().naive_utc();

        let stamp = store.index().get("Git").unwrap().timestamp;
        assert!(stamp >= before - TimeDelta::milliseconds(1));
        assert!(stamp <= after + TimeDelta::milliseconds(1));
    }

    #[tokio::test]
    async fn test_second_save_keeps_old_file() {
        let tmp = TempDir::new().unwrap();
        let store = ReportStore::new(tmp.path());

        let first = store
            .persist(&AnalysisDocument::new("Git", "## Package: Git\nv1\n"))
            .await
            .unwrap();
        let second = store
            .persist(&AnalysisDocument::new("Git", "## Package: Git\nv2\n"))
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert_eq!(store.index().get("Git").unwrap().path, second);
        assert_eq!(store.index().len(), 1);
    }

    #[tokio::test]
    async fn test_persist_combined_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = ReportStore::new(tmp.path());
        let packages = vec![
            package("7-Zip", "7zip.7zip"),
            package("Mozilla Firefox", "Mozilla.Firefox"),
            package("", "Vendor.Nameless"),
        ];
        let results: Vec<_> = packages
            .iter()
            .map(|p| ResearchResult::analyzed(p.clone(), "Looks fine.".to_string()))
            .collect();

        let combined = assemble(&results, Local::now());
        let saved = store.persist_combined(&combined, &packages).await;

        assert_eq!(saved.len(), 3);
        assert!(saved.iter().all(|(_, r)| r.is_ok()));
        assert!(store.index().get("Mozilla Firefox").is_some());
        assert!(store.index().get("Vendor.Nameless").is_some());
    }

    #[tokio::test]
    async fn test_reload_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = ReportStore::new(tmp.path());
        for key in ["A", "B", "B", "C"] {
            store
                .persist(&AnalysisDocument::new(key, format!("## Package: {}\n", key)))
                .await
                .unwrap();
        }
        std::fs::write(tmp.path().join("README.md"), "not a report").unwrap();
        std::fs::write(tmp.path().join("A_notes.md"), "not a report").unwrap();

        let fresh = ReportStore::new(tmp.path());
        assert_eq!(fresh.reload(), 3);
        let first = fresh.index().snapshot();
        assert_eq!(fresh.reload(), 3);
        assert_eq!(fresh.index().snapshot(), first);
        assert_eq!(first, store.index().snapshot());
    }

    #[test]
    fn test_reload_prefers_newest_timestamp() {
        let tmp = TempDir::new().unwrap();
        // Names chosen so lexical order disagrees with time order
        for name in [
            "Git_20240101-090000-000.md",
            "Git_20231231-235959-999.md",
            "Git_20240101-085959-500.md",
        ] {
            std::fs::write(tmp.path().join(name), "## Package: Git\n").unwrap();
        }

        let store = ReportStore::new(tmp.path());
        assert_eq!(store.reload(), 1);
        let entry = store.index().get("Git").unwrap();
        assert!(entry.path.ends_with("Git_20240101-090000-000.md"));
    }

    #[test]
    fn test_reload_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = ReportStore::new(tmp.path().join("missing"));
        assert_eq!(store.reload(), 0);
        assert!(store.index().is_empty());
    }

    #[tokio::test]
    async fn test_persist_into_file_path_fails() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("reports");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let store = ReportStore::new(&blocker);
        let err = store
            .persist(&AnalysisDocument::new("Git", "## Package: Git\n"))
            .await
            .unwrap_err();
        assert!(matches!(err, PkgError::Persistence { .. }));
        assert!(store.index().is_empty());
    }

    #[tokio::test]
    async fn test_load_unknown_key() {
        let tmp = TempDir::new().unwrap();
        let store = ReportStore::new(tmp.path());
        assert!(matches!(
            store.load("nothing").await.unwrap_err(),
            PkgError::PackageNotFound(_)
        ));
    }
}

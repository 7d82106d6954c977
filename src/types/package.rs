//! Package Inventory Types
//!
//! One row of package-manager output and the snapshot collection that holds them.

use serde::{Deserialize, Serialize};

use crate::constants::source;

/// One row of parsed inventory/upgrade data for a single package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Display name (not unique)
    pub name: String,
    /// Stable package identifier, unique within one snapshot
    pub id: String,
    /// Origin catalog tag
    pub source: String,
    /// Installed version (opaque string)
    pub current_version: String,
    /// Version offered by the source, empty when unknown
    pub available_version: String,
    /// Short label reflecting the last operation outcome
    pub status: String,
    /// Full AI analysis text, empty until research runs
    pub recommendation: String,
}

impl PackageRecord {
    /// Create a freshly discovered record
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        current_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            source: source::PRIMARY.to_string(),
            current_version: current_version.into(),
            available_version: String::new(),
            status: String::new(),
            recommendation: String::new(),
        }
    }

    pub fn with_available(mut self, available_version: impl Into<String>) -> Self {
        self.available_version = available_version.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Whether the source offers a different version (string inequality only)
    pub fn has_upgrade(&self) -> bool {
        !self.available_version.is_empty() && self.available_version != self.current_version
    }

    /// Key used for report files and the report index: name, falling back to id
    pub fn report_key(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Whether `label` refers to this package by name or id
    pub fn matches(&self, label: &str) -> bool {
        let label = label.trim();
        self.name == label || self.id.eq_ignore_ascii_case(label)
    }
}

/// In-memory package snapshot
///
/// Replaced wholesale on every scan; research only rewrites
/// `status`/`recommendation` on existing records.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    records: Vec<PackageRecord>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous snapshot and take a new one
    pub fn replace(&mut self, records: Vec<PackageRecord>) {
        self.records = records;
    }

    pub fn records(&self) -> &[PackageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&PackageRecord> {
        self.records.iter().find(|r| r.id.eq_ignore_ascii_case(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut PackageRecord> {
        self.records.iter_mut().find(|r| r.id.eq_ignore_ascii_case(id))
    }

    /// First record with the given display name
    pub fn find_by_name(&self, name: &str) -> Option<&PackageRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Records whose available version differs from the installed one
    pub fn upgradable(&self) -> impl Iterator<Item = &PackageRecord> {
        self.records.iter().filter(|r| r.has_upgrade())
    }
}

impl From<Vec<PackageRecord>> for Inventory {
    fn from(records: Vec<PackageRecord>) -> Self {
        Self { records }
    }
}

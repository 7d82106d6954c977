//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use crate::ai::provider::{ProviderKind, SharedProvider, create_provider};
use crate::config::{Config, ConfigLoader};
use crate::inventory::WingetCli;
use crate::report::ReportStore;
use crate::types::{Inventory, PackageRecord, PkgError, Result};

/// Command execution context
///
/// Everything a command needs, built once from the loaded configuration.
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Package-manager invoker
    pub cli: WingetCli,
    /// Report directory and index
    pub reports: ReportStore,
}

impl CommandContext {
    /// Load configuration and build the collaborators it describes
    pub fn load() -> Result<Self> {
        Ok(Self::from_config(ConfigLoader::load()?))
    }

    pub fn from_config(config: Config) -> Self {
        let cli = WingetCli::new(config.cli.binary.clone(), config.cli.timeout_secs);
        let reports = ReportStore::new(config.reports.dir.clone());
        Self {
            config,
            cli,
            reports,
        }
    }

    /// Provider for this run, honoring command-line overrides
    pub fn provider(&self, kind: Option<ProviderKind>, model: Option<&str>) -> Result<SharedProvider> {
        let kind = kind.unwrap_or(self.config.ai.provider);
        create_provider(&self.config.ai.provider_config(kind, model))
    }
}

/// Pick the packages to research from an upgradable snapshot
///
/// Explicit ids win over `all`. Unknown ids are reported together.
pub fn select_packages(inventory: &Inventory, ids: &[String], all: bool) -> Result<Vec<PackageRecord>> {
    if ids.is_empty() {
        return Ok(if all {
            inventory.upgradable().cloned().collect()
        } else {
            Vec::new()
        });
    }

    let mut selected = Vec::with_capacity(ids.len());
    let mut missing = Vec::new();
    for id in ids {
        match inventory.find_by_id(id) {
            Some(record) if !selected.iter().any(|r: &PackageRecord| r.id == record.id) => {
                selected.push(record.clone())
            }
            Some(_) => {}
            None => missing.push(id.as_str()),
        }
    }

    if !missing.is_empty() {
        return Err(PkgError::PackageNotFound(missing.join(", ")));
    }
    Ok(selected)
}

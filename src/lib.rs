//! pkgsage - AI-Assisted Package Upgrade Analysis
//!
//! Inventories installed software through the `winget` command line, asks a
//! remote AI provider how risky each available upgrade is, and keeps one
//! Markdown report per package.
//!
//! ## Core Features
//!
//! - **Table Parsing**: fixed-width package-manager output into typed records
//! - **Two Providers**: Anthropic (model reasoning) and Perplexity (web search)
//! - **Bounded Research**: ordered, cancellable batches with a shared call gate
//! - **Report Index**: per-package files rebuildable from the reports directory
//!
//! ## Quick Start
//!
//! ```ignore
//! use pkgsage::{ResearchOrchestrator, WingetCli, ReportStore};
//! use pkgsage::inventory::{ParseMode, scan};
//!
//! let records = scan(&WingetCli::default(), ParseMode::Upgradable).await;
//! let provider = pkgsage::ai::create_provider(&config.ai.provider_config(kind, None))?;
//! let results = ResearchOrchestrator::new(provider, 1).research(records).await;
//! let combined = pkgsage::report::assemble(&results, chrono::Local::now());
//! ReportStore::new("reports").persist_combined(&combined, &known).await;
//! ```
//!
//! ## Modules
//!
//! - [`inventory`]: package-manager invocation and table parsing
//! - [`ai`]: prompt construction and provider adapters
//! - [`research`]: batch orchestration and progress events
//! - [`report`]: report assembly, splitting and indexing
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod inventory;
pub mod report;
pub mod research;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, PkgError, Result, ResultExt};

// Domain
pub use types::{Inventory, PackageRecord, SafeKey};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use inventory::{PackageCli, ParseMode, WingetCli};
pub use report::{AnalysisDocument, ReportIndex, ReportIndexEntry, ReportStore};
pub use research::{
    BatchSummary, CancelFlag, ResearchEvent, ResearchOrchestrator, ResearchOutcome,
    ResearchResult,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    AnalysisProvider, ProviderConfig, ProviderKind, SharedProvider, TimeoutConfig,
    create_provider, with_timeout,
};

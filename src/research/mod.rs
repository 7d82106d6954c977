//! Research
//!
//! Runs upgrade-risk analyses for a batch of packages and folds the outcomes
//! back into the inventory.
//!
//! - `orchestrator`: bounded, ordered, cancellable batch execution
//! - `progress`: broadcast events and the cancellation flag

pub mod orchestrator;
pub mod progress;

pub use orchestrator::ResearchOrchestrator;
pub use progress::{CancelFlag, ProgressReporter, ResearchEvent};

use serde::Serialize;
use tracing::debug;

use crate::types::{Inventory, PkgError, PackageRecord};

/// Status written onto a package after a successful analysis
pub const STATUS_ANALYZED: &str = "Analyzed";
/// Status written onto a package whose analysis failed
pub const STATUS_FAILED: &str = "Analysis failed";
/// Status written when no provider credentials are configured
pub const STATUS_NOT_CONFIGURED: &str = "Not analyzed";

/// Longest provider error message carried into a failure description
const MAX_DETAIL_CHARS: usize = 200;

// =============================================================================
// Results
// =============================================================================

/// How one package's analysis ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchOutcome {
    Analyzed,
    Failed,
    NotConfigured,
}

/// Outcome of one package's analysis
#[derive(Debug, Clone, Serialize)]
pub struct ResearchResult {
    /// Package as researched, with status and recommendation filled in
    pub package: PackageRecord,
    /// Provider text, or a failure description
    pub analysis: String,
    pub outcome: ResearchOutcome,
}

impl ResearchResult {
    pub fn analyzed(mut package: PackageRecord, analysis: String) -> Self {
        package.status = STATUS_ANALYZED.to_string();
        package.recommendation = analysis.clone();
        Self {
            package,
            analysis,
            outcome: ResearchOutcome::Analyzed,
        }
    }

    pub fn failed(mut package: PackageRecord, description: String) -> Self {
        package.status = STATUS_FAILED.to_string();
        package.recommendation = description.clone();
        Self {
            package,
            analysis: description,
            outcome: ResearchOutcome::Failed,
        }
    }

    pub fn not_configured(mut package: PackageRecord) -> Self {
        package.status = STATUS_NOT_CONFIGURED.to_string();
        package.recommendation.clear();
        Self {
            package,
            analysis: String::new(),
            outcome: ResearchOutcome::NotConfigured,
        }
    }

    pub fn key(&self) -> &str {
        self.package.report_key()
    }

    /// Whether there is any text worth writing into a report
    pub fn has_content(&self) -> bool {
        !self.analysis.trim().is_empty()
    }
}

/// Aggregate view of a finished batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub requested: usize,
    pub analyzed: usize,
    pub failed: usize,
    pub not_configured: usize,
    pub cancelled: bool,
}

impl BatchSummary {
    pub fn from_results(requested: usize, results: &[ResearchResult], cancelled: bool) -> Self {
        let count = |outcome: ResearchOutcome| {
            results.iter().filter(|r| r.outcome == outcome).count()
        };
        Self {
            requested,
            analyzed: count(ResearchOutcome::Analyzed),
            failed: count(ResearchOutcome::Failed),
            not_configured: count(ResearchOutcome::NotConfigured),
            cancelled,
        }
    }

    pub fn completed(&self) -> usize {
        self.analyzed + self.failed + self.not_configured
    }

    /// No package produced any analysis text
    pub fn is_empty(&self) -> bool {
        self.analyzed == 0 && self.failed == 0
    }

    /// Some results carry an embedded failure description
    pub fn has_errors(&self) -> bool {
        self.failed > 0
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "no results ({} requested", self.requested)?;
        } else {
            write!(
                f,
                "{} analyzed, {} failed ({} requested",
                self.analyzed, self.failed, self.requested
            )?;
        }
        if self.not_configured > 0 {
            write!(f, ", {} without provider", self.not_configured)?;
        }
        if self.cancelled {
            write!(f, ", cancelled after {}", self.completed())?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// Failure Descriptions
// =============================================================================

/// Turn a provider failure into a sentence suitable for a recommendation field
pub fn describe_failure(provider: &str, err: &PkgError) -> String {
    let category = err.category();
    let detail = match err {
        PkgError::Provider { status, body, .. } => match provider_message(body) {
            Some(message) => format!("{} HTTP {}: {}", provider, status, message),
            None => format!("{} HTTP {}", provider, status),
        },
        PkgError::Transport { cause, .. } => format!("{}: {}", provider, truncate(cause)),
        PkgError::Timeout { duration, .. } => {
            format!("{}: no response within {}s", provider, duration.as_secs())
        }
        other => format!("{}: {}", provider, truncate(&other.to_string())),
    };
    format!(
        "Analysis failed [{}]: {} ({})",
        category,
        category.hint(),
        detail
    )
}

/// Extract the human-readable message from a JSON error body
fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())?;
    Some(truncate(message))
}

fn truncate(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= MAX_DETAIL_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_DETAIL_CHARS).collect();
    cut.push('…');
    cut
}

// =============================================================================
// Inventory Update
// =============================================================================

/// Write status and recommendation from results back onto the inventory
///
/// Records are matched by id; order and membership are left untouched.
pub fn apply_results(inventory: &mut Inventory, results: &[ResearchResult]) -> usize {
    let mut applied = 0;
    for result in results {
        match inventory.find_by_id_mut(&result.package.id) {
            Some(record) => {
                record.status = result.package.status.clone();
                record.recommendation = result.package.recommendation.clone();
                applied += 1;
            }
            None => debug!("No inventory record for {}", result.package.id),
        }
    }
    applied
}

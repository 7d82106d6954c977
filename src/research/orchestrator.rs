//! Research Orchestrator
//!
//! Runs one analysis per package with a bounded number of provider calls in
//! flight. Results come back in submission order; one package failing never
//! aborts the batch, only cancellation stops it early.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::progress::{CancelFlag, ProgressReporter, ResearchEvent};
use super::{BatchSummary, ResearchResult, describe_failure};
use crate::ai::prompt::build_prompt;
use crate::ai::provider::SharedProvider;
use crate::ai::timeout::{TimeoutConfig, with_timeout};
use crate::constants::research as research_constants;
use crate::types::{PackageRecord, PkgError};

/// Batch runner for upgrade-risk analyses
pub struct ResearchOrchestrator {
    provider: SharedProvider,
    /// Permits for provider calls; shared between orchestrators built with `with_gate`
    gate: Arc<Semaphore>,
    limit: usize,
    timeout: Duration,
    cancel: CancelFlag,
    reporter: ProgressReporter,
}

impl ResearchOrchestrator {
    /// Create an orchestrator allowing `concurrency_limit` calls in flight
    ///
    /// The limit is clamped to `1..=MAX_CONCURRENCY`.
    pub fn new(provider: SharedProvider, concurrency_limit: usize) -> Self {
        let limit = concurrency_limit.clamp(1, research_constants::MAX_CONCURRENCY);
        Self {
            provider,
            gate: Arc::new(Semaphore::new(limit)),
            limit,
            timeout: TimeoutConfig::default().provider_request,
            cancel: CancelFlag::new(),
            reporter: ProgressReporter::new(),
        }
    }

    /// Share a call gate with other orchestrators so their batches serialize together
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn gate(&self) -> Arc<Semaphore> {
        Arc::clone(&self.gate)
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    pub fn concurrency_limit(&self) -> usize {
        self.limit
    }

    /// Analyze every package and return one result per started package, in order
    ///
    /// Packages not started before cancellation produce no result, and a call
    /// that completes after cancellation has its result dropped.
    #[instrument(skip(self, packages), fields(provider = %self.provider.name(), count = packages.len()))]
    pub async fn research(&self, packages: Vec<PackageRecord>) -> Vec<ResearchResult> {
        let total = packages.len();
        info!(
            "Researching {} packages with {} (model: {}, concurrency: {})",
            total,
            self.provider.name(),
            self.provider.model(),
            self.limit
        );

        self.reporter.emit(ResearchEvent::BatchStarted {
            total,
            provider: self.provider.name().to_string(),
        });

        let results: Vec<ResearchResult> = if self.provider.is_configured() {
            stream::iter(packages.into_iter().enumerate())
                .map(|(index, package)| self.research_one(index + 1, total, package))
                .buffered(self.limit)
                .filter_map(|result| async move { result })
                .collect()
                .await
        } else {
            warn!(
                "{} has no API key configured, skipping analysis",
                self.provider.name()
            );
            packages
                .into_iter()
                .map(ResearchResult::not_configured)
                .collect()
        };

        let summary = BatchSummary::from_results(total, &results, self.cancel.is_cancelled());
        info!("Research finished: {}", summary);
        self.reporter.emit(ResearchEvent::BatchFinished { summary });

        results
    }

    async fn research_one(
        &self,
        position: usize,
        total: usize,
        package: PackageRecord,
    ) -> Option<ResearchResult> {
        let key = package.report_key().to_string();

        if self.cancel.is_cancelled() {
            self.reporter.emit(ResearchEvent::Skipped { key });
            return None;
        }

        let permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Research gate closed, skipping {}", key);
                return None;
            }
        };

        // Cancellation may have tripped while waiting for a permit
        if self.cancel.is_cancelled() {
            self.reporter.emit(ResearchEvent::Skipped { key });
            return None;
        }

        self.reporter.emit(ResearchEvent::Analyzing {
            position,
            total,
            key: key.clone(),
        });
        debug!("Analyzing ({}/{}) {}", position, total, key);

        let prompt = build_prompt(
            &package.name,
            &package.id,
            &package.current_version,
            &package.available_version,
        );
        let outcome = with_timeout(
            self.timeout,
            self.provider.analyze(&prompt),
            &format!("analysis of {}", key),
        )
        .await;
        drop(permit);

        if self.cancel.is_cancelled() {
            debug!("Discarding result for {} after cancellation", key);
            self.reporter.emit(ResearchEvent::Discarded { key });
            return None;
        }

        // A configured provider answering with no text has nothing to report
        let outcome = outcome.and_then(|analysis| {
            if analysis.trim().is_empty() {
                Err(PkgError::transport(self.provider.name(), "empty analysis text"))
            } else {
                Ok(analysis)
            }
        });

        let result = match outcome {
            Ok(analysis) => ResearchResult::analyzed(package, analysis),
            Err(e) => {
                warn!("Analysis of {} failed: {}", key, e);
                ResearchResult::failed(package, describe_failure(self.provider.name(), &e))
            }
        };

        self.reporter.emit(ResearchEvent::Analyzed {
            position,
            total,
            key,
            failed: result.outcome == super::ResearchOutcome::Failed,
        });

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::AnalysisProvider;
    use crate::research::{ResearchOutcome, STATUS_ANALYZED};
    use crate::types::{PkgError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    /// Fake provider that records call windows and in-flight counts
    struct RecordingProvider {
        configured: bool,
        delay: Duration,
        fail_on: Option<&'static str>,
        empty_on: Option<&'static str>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        windows: Mutex<Vec<(Instant, Instant)>>,
        cancel_after_first: Option<CancelFlag>,
    }

    impl RecordingProvider {
        fn new(delay_ms: u64) -> Self {
            Self {
                configured: true,
                delay: Duration::from_millis(delay_ms),
                fail_on: None,
                empty_on: None,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                windows: Mutex::new(Vec::new()),
                cancel_after_first: None,
            }
        }
    }

    #[async_trait]
    impl AnalysisProvider for RecordingProvider {
        async fn analyze(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let start = Instant::now();
            tokio::time::sleep(self.delay).await;
            let end = Instant::now();

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.windows.lock().unwrap().push((start, end));

            if let Some(flag) = &self.cancel_after_first {
                flag.cancel();
            }

            if let Some(needle) = self.fail_on
                && prompt.contains(needle)
            {
                return Err(PkgError::provider("fake", 429, "slow down"));
            }

            if let Some(needle) = self.empty_on
                && prompt.contains(needle)
            {
                return Ok("  \n".to_string());
            }

            let name = prompt
                .lines()
                .find_map(|l| l.strip_prefix("- **Name**: "))
                .unwrap_or("?");
            Ok(format!("analysis for {}", name))
        }

        fn name(&self) -> &str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-1"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }
    }

    fn packages(n: usize) -> Vec<PackageRecord> {
        (0..n)
            .map(|i| {
                PackageRecord::new(format!("Pkg{}", i), format!("Vendor.Pkg{}", i), "1.0")
                    .with_available("2.0")
            })
            .collect()
    }

    #[tokio::test]
    async fn test_limit_one_never_overlaps() {
        let provider = Arc::new(RecordingProvider::new(15));
        let orchestrator = ResearchOrchestrator::new(provider.clone(), 1);

        let results = orchestrator.research(packages(4)).await;
        assert_eq!(results.len(), 4);
        assert_eq!(provider.max_in_flight.load(Ordering::SeqCst), 1);

        let mut windows = provider.windows.lock().unwrap().clone();
        windows.sort_by_key(|(start, _)| *start);
        for pair in windows.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "provider calls overlapped");
        }
    }

    #[tokio::test]
    async fn test_results_in_submission_order() {
        let provider = Arc::new(RecordingProvider::new(5));
        let orchestrator = ResearchOrchestrator::new(provider.clone(), 3);

        let results = orchestrator.research(packages(6)).await;
        let keys: Vec<_> = results.iter().map(|r| r.key().to_string()).collect();
        assert_eq!(keys, vec!["Pkg0", "Pkg1", "Pkg2", "Pkg3", "Pkg4", "Pkg5"]);
        assert!(provider.max_in_flight.load(Ordering::SeqCst) <= 3);
        assert_eq!(results[2].analysis, "analysis for Pkg2");
        assert_eq!(results[2].package.status, STATUS_ANALYZED);
    }

    #[tokio::test]
    async fn test_shared_gate_serializes_batches() {
        let provider = Arc::new(RecordingProvider::new(10));
        let first = ResearchOrchestrator::new(provider.clone(), 1);
        let second = ResearchOrchestrator::new(provider.clone(), 1).with_gate(first.gate());

        let (a, b) = tokio::join!(first.research(packages(2)), second.research(packages(2)));
        assert_eq!(a.len() + b.len(), 4);
        assert_eq!(provider.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_makes_no_calls() {
        let provider = Arc::new(RecordingProvider {
            configured: false,
            ..RecordingProvider::new(0)
        });
        let orchestrator = ResearchOrchestrator::new(provider.clone(), 2);

        let results = orchestrator.research(packages(3)).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.outcome == ResearchOutcome::NotConfigured));
        assert!(results.iter().all(|r| r.package.recommendation.is_empty()));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_analysis_counts_as_failure() {
        let provider = Arc::new(RecordingProvider {
            empty_on: Some("Pkg0"),
            ..RecordingProvider::new(0)
        });
        let orchestrator = ResearchOrchestrator::new(provider, 1);

        let results = orchestrator.research(packages(2)).await;
        assert_eq!(results[0].outcome, ResearchOutcome::Failed);
        assert!(results[0].package.recommendation.contains("empty analysis text"));
        assert!(results[0].has_content());
        assert_eq!(results[1].outcome, ResearchOutcome::Analyzed);

        let summary = crate::research::BatchSummary::from_results(2, &results, false);
        assert_eq!(summary.analyzed, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let provider = Arc::new(RecordingProvider {
            fail_on: Some("Pkg1"),
            ..RecordingProvider::new(0)
        });
        let orchestrator = ResearchOrchestrator::new(provider, 1);

        let results = orchestrator.research(packages(3)).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].outcome, ResearchOutcome::Analyzed);
        assert_eq!(results[1].outcome, ResearchOutcome::Failed);
        assert!(results[1].package.recommendation.contains("[RATE_LIMIT]"));
        assert!(results[1].package.recommendation.contains("fake HTTP 429"));
        assert_eq!(results[2].outcome, ResearchOutcome::Analyzed);
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure() {
        let provider = Arc::new(RecordingProvider::new(200));
        let orchestrator =
            ResearchOrchestrator::new(provider, 1).with_timeout(Duration::from_millis(10));

        let results = orchestrator.research(packages(1)).await;
        assert_eq!(results[0].outcome, ResearchOutcome::Failed);
        assert!(results[0].analysis.contains("[NETWORK]"));
    }

    #[tokio::test]
    async fn test_cancel_before_start_produces_nothing() {
        let provider = Arc::new(RecordingProvider::new(0));
        let cancel = CancelFlag::new();
        cancel.cancel();
        let orchestrator = ResearchOrchestrator::new(provider.clone(), 1).with_cancel(cancel);

        assert!(orchestrator.research(packages(3)).await.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_mid_batch_discards_in_flight() {
        let cancel = CancelFlag::new();
        let provider = Arc::new(RecordingProvider {
            cancel_after_first: Some(cancel.clone()),
            ..RecordingProvider::new(0)
        });
        let orchestrator = ResearchOrchestrator::new(provider.clone(), 1).with_cancel(cancel);
        let mut events = orchestrator.reporter().subscribe();

        let results = orchestrator.research(packages(3)).await;
        assert!(results.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let mut discarded = 0;
        let mut skipped = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                ResearchEvent::Discarded { .. } => discarded += 1,
                ResearchEvent::Skipped { .. } => skipped += 1,
                ResearchEvent::BatchFinished { summary } => assert!(summary.cancelled),
                _ => {}
            }
        }
        assert_eq!(discarded, 1);
        assert_eq!(skipped, 2);
    }

    #[tokio::test]
    async fn test_progress_events_carry_position() {
        let provider = Arc::new(RecordingProvider::new(0));
        let orchestrator = ResearchOrchestrator::new(provider, 1);
        let mut events = orchestrator.reporter().subscribe();

        orchestrator.research(packages(2)).await;

        let mut labels = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let Some(label) = event.status_label() {
                labels.push(label);
            }
        }
        assert_eq!(
            labels,
            vec!["Analyzing (1/2)", "Analyzed", "Analyzing (2/2)", "Analyzed"]
        );
    }

    #[test]
    fn test_limit_is_clamped() {
        let provider = Arc::new(RecordingProvider::new(0));
        assert_eq!(ResearchOrchestrator::new(provider.clone(), 0).concurrency_limit(), 1);
        assert_eq!(
            ResearchOrchestrator::new(provider, 100).concurrency_limit(),
            research_constants::MAX_CONCURRENCY
        );
    }
}

//! Research Command
//!
//! Scan upgradable packages, analyze the selected ones, and save one report
//! per package.
//!
//! Usage:
//!   pkgsage research --all
//!   pkgsage research --id Git.Git --id 7zip.7zip --provider perplexity

use chrono::Local;
use std::time::Duration;
use tracing::{info, warn};

use crate::ai::provider::ProviderKind;
use crate::cli::progress::ConsoleRenderer;
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, select_packages};
use crate::inventory::{ParseMode, scan};
use crate::report::assemble;
use crate::research::{BatchSummary, CancelFlag, ResearchOrchestrator, apply_results};
use crate::types::{Inventory, Result};

/// Options for a research run
#[derive(Debug, Clone, Default)]
pub struct ResearchOptions {
    pub ids: Vec<String>,
    pub all: bool,
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub concurrency: Option<usize>,
    pub quiet: bool,
}

pub async fn run(options: ResearchOptions) -> Result<()> {
    let ctx = CommandContext::load()?;
    let output = Output::new();

    let provider = ctx.provider(options.provider, options.model.as_deref())?;
    if !provider.is_configured() {
        output.warning(&format!(
            "No API key configured for {}. Set it in the config file or via {}.",
            provider.name(),
            options
                .provider
                .unwrap_or(ctx.config.ai.provider)
                .key_env_var()
        ));
    }

    output.info("Scanning for upgradable packages...");
    let mut inventory = Inventory::from(scan(&ctx.cli, ParseMode::Upgradable).await);

    let selected = select_packages(&inventory, &options.ids, options.all)?;
    if selected.is_empty() {
        if options.ids.is_empty() && !options.all {
            output.info("Nothing selected. Use --id <ID> (repeatable) or --all.");
        } else {
            output.info("No upgradable packages to research.");
        }
        return Ok(());
    }

    let cancel = CancelFlag::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing in-flight analysis");
                cancel.cancel();
            }
        })
    };

    let orchestrator = ResearchOrchestrator::new(
        provider,
        options.concurrency.unwrap_or(ctx.config.ai.concurrency),
    )
    .with_timeout(Duration::from_secs(ctx.config.ai.timeout_secs))
    .with_cancel(cancel.clone());

    let renderer = (!options.quiet).then(|| {
        ConsoleRenderer::new(orchestrator.reporter().subscribe())
            .with_bar(console::Term::stdout().is_term())
            .start_render_loop()
    });

    let requested = selected.len();
    let results = orchestrator.research(selected).await;
    ctrl_c.abort();
    if let Some(handle) = renderer {
        let _ = handle.await;
    }

    apply_results(&mut inventory, &results);
    let summary = BatchSummary::from_results(requested, &results, cancel.is_cancelled());

    let researched: Vec<_> = inventory
        .records()
        .iter()
        .filter(|r| !r.status.is_empty())
        .cloned()
        .collect();
    if !researched.is_empty() {
        output.section("Packages");
        output.packages(&researched, true);
    }

    if summary.is_empty() {
        output.warning(&format!("No results: {}", summary));
        return Ok(());
    }

    let combined = assemble(&results, Local::now());
    let known: Vec<_> = results.iter().map(|r| r.package.clone()).collect();
    let saved = ctx.reports.persist_combined(&combined, &known).await;

    output.section("Reports");
    for (key, outcome) in &saved {
        match outcome {
            Ok(path) => output.success(&format!("{} → {}", key, path.display())),
            Err(e) => output.error(&format!("{}: {}", key, e)),
        }
    }

    info!("Research summary: {}", summary);
    println!();
    if summary.has_errors() {
        output.warning(&format!("Finished with failures: {}", summary));
    } else {
        output.success(&format!("Finished: {}", summary));
    }
    Ok(())
}

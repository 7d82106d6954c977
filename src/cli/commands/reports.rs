//! Reports Commands
//!
//! List indexed reports and print the newest one for a package.

use console::style;

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::types::Result;

/// List the newest report per package
pub fn list(json: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    ctx.reports.reload();
    let entries = ctx.reports.index().entries();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let output = Output::new();
    if entries.is_empty() {
        output.info(&format!(
            "No reports in {}",
            ctx.reports.dir().display()
        ));
        return Ok(());
    }

    output.section(&format!("Reports ({})", entries.len()));
    for entry in &entries {
        println!(
            "  {}  {}  {}",
            style(&entry.key).bold(),
            style(entry.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
            entry.path.display()
        );
    }
    Ok(())
}

/// Print the newest report for a package name or id
pub async fn show(key: &str) -> Result<()> {
    let ctx = CommandContext::load()?;
    ctx.reports.reload();
    let text = ctx.reports.load(key).await?;
    println!("{}", text);
    Ok(())
}

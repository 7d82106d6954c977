//! Scan Commands
//!
//! `list` and `upgradable`: print the package manager's inventory.

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::inventory::{ParseMode, scan};
use crate::types::{Inventory, Result};

pub async fn run(mode: ParseMode, json: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    let inventory = Inventory::from(scan(&ctx.cli, mode).await);

    if json {
        println!("{}", serde_json::to_string_pretty(inventory.records())?);
        return Ok(());
    }

    let output = Output::new();
    if inventory.is_empty() {
        output.warning("No packages found. Is the package manager installed and on PATH?");
        return Ok(());
    }

    output.packages(inventory.records(), mode == ParseMode::Upgradable);
    println!();
    match mode {
        ParseMode::Inventory => output.info(&format!("{} packages installed", inventory.len())),
        ParseMode::Upgradable => output.info(&format!(
            "{} packages with upgrades available",
            inventory.upgradable().count()
        )),
    }
    Ok(())
}

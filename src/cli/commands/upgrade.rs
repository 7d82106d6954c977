//! Upgrade Command
//!
//! Upgrade one package through the package manager.

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::constants::cli as cli_constants;
use crate::inventory::upgrade_package;
use crate::types::{PkgError, Result};

pub async fn run(id: &str) -> Result<()> {
    let ctx = CommandContext::load()?;
    let output = Output::new();

    output.info(&format!("Upgrading {}", id));
    let text = upgrade_package(&ctx.cli, id).await;
    println!("{}", text.trim_end());

    if text == cli_constants::INVALID_COMMAND_SENTINEL
        || text.starts_with(cli_constants::COMMAND_FAILED_PREFIX)
    {
        return Err(PkgError::Invoker(text));
    }

    output.success(&format!("Package manager finished for {}", id));
    Ok(())
}

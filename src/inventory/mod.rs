//! Package Inventory
//!
//! Scans the package manager and turns its table output into records.
//!
//! - `invoker`: runs whitelisted commands, text in / text out
//! - `parser`: fixed-width table parsing
//! - `heuristics`: column guessing for tables without a schema

pub mod heuristics;
pub mod invoker;
pub mod parser;

pub use invoker::{PackageCli, WingetCli};
pub use parser::{ParseMode, parse};

use tracing::info;

use crate::types::PackageRecord;

/// Command listing installed packages
pub const LIST_COMMAND: &str = "list";

/// Command listing packages with a newer version available
pub const UPGRADE_LIST_COMMAND: &str = "upgrade --include-unknown";

/// Run one scan and parse its output
pub async fn scan(cli: &dyn PackageCli, mode: ParseMode) -> Vec<PackageRecord> {
    let command = match mode {
        ParseMode::Inventory => LIST_COMMAND,
        ParseMode::Upgradable => UPGRADE_LIST_COMMAND,
    };

    let raw = cli.invoke(command).await;
    let records = parse(&raw, mode);
    info!("Scan '{}' found {} packages", command, records.len());
    records
}

/// Upgrade a single package by id and return the tool's output
pub async fn upgrade_package(cli: &dyn PackageCli, id: &str) -> String {
    cli.invoke(&format!("upgrade --id \"{}\" --exact", id)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedCli {
        output: String,
        commands: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PackageCli for ScriptedCli {
        async fn invoke(&self, command: &str) -> String {
            self.commands
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(command.to_string());
            self.output.clone()
        }
    }

    #[tokio::test]
    async fn test_scan_uses_mode_command() {
        let cli = ScriptedCli {
            output: "Name  Id  Version  Available  Source\n---\nA  Vendor.A  1.0  2.0  winget\n"
                .to_string(),
            commands: Mutex::new(Vec::new()),
        };

        let records = scan(&cli, ParseMode::Upgradable).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].available_version, "2.0");

        let _ = scan(&cli, ParseMode::Inventory).await;
        let commands = cli.commands.lock().unwrap().clone();
        assert_eq!(commands, vec![UPGRADE_LIST_COMMAND, LIST_COMMAND]);
    }

    #[tokio::test]
    async fn test_scan_of_failure_text_is_empty() {
        let cli = ScriptedCli {
            output: "Command failed: cannot start winget".to_string(),
            commands: Mutex::new(Vec::new()),
        };
        assert!(scan(&cli, ParseMode::Inventory).await.is_empty());
    }

    #[tokio::test]
    async fn test_upgrade_package_command() {
        let cli = ScriptedCli {
            output: "Successfully installed".to_string(),
            commands: Mutex::new(Vec::new()),
        };
        let out = upgrade_package(&cli, "Git.Git").await;
        assert_eq!(out, "Successfully installed");
        let commands = cli.commands.lock().unwrap().clone();
        assert_eq!(commands, vec!["upgrade --id \"Git.Git\" --exact"]);
        assert!(invoker::is_allowed(&commands[0]));
    }
}

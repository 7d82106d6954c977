//! Package Manager Invoker
//!
//! Runs whitelisted package-manager commands and returns their raw text output.
//! Exit codes are never inspected; failures come back as descriptive text.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::constants::cli as cli_constants;

/// Text-in/text-out boundary to the package manager
#[async_trait]
pub trait PackageCli: Send + Sync {
    /// Run `command` (verb plus arguments, without the binary name)
    async fn invoke(&self, command: &str) -> String;
}

/// Check that the command starts with an allowed verb
pub fn is_allowed(command: &str) -> bool {
    command
        .split_whitespace()
        .next()
        .is_some_and(|verb| cli_constants::ALLOWED_VERBS.contains(&verb))
}

/// Split a command line into arguments, honoring double quotes
pub fn split_args(command: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in command.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

/// Invoker backed by the real `winget` executable
#[derive(Debug, Clone)]
pub struct WingetCli {
    binary: String,
    timeout: Duration,
}

impl WingetCli {
    pub fn new(binary: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn failure(reason: impl std::fmt::Display) -> String {
        format!("{}: {}", cli_constants::COMMAND_FAILED_PREFIX, reason)
    }
}

impl Default for WingetCli {
    fn default() -> Self {
        Self::new(cli_constants::DEFAULT_BINARY, cli_constants::DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait]
impl PackageCli for WingetCli {
    async fn invoke(&self, command: &str) -> String {
        if !is_allowed(command) {
            warn!("Rejected package manager command: {}", command);
            return cli_constants::INVALID_COMMAND_SENTINEL.to_string();
        }

        let mut args = split_args(command);
        args.extend(
            cli_constants::NON_INTERACTIVE_FLAGS
                .iter()
                .map(|f| f.to_string()),
        );

        info!("Running {} {}", self.binary, command);

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn {}: {}", self.binary, e);
                return Self::failure(format!("cannot start {}: {}", self.binary, e));
            }
        };

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Self::failure(e),
            Err(_) => {
                warn!("{} timed out after {:?}", self.binary, self.timeout);
                return Self::failure(format!("timed out after {}s", self.timeout.as_secs()));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "{} exited with {} ({} bytes of output)",
            self.binary,
            output.status,
            stdout.len()
        );

        if stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                return Self::failure(stderr.trim());
            }
        }

        stdout
    }
}

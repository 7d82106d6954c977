//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global and project (.pkgsage/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::provider::{ProviderConfig, ProviderKind};
use crate::constants::{cli as cli_constants, network, provider, report, research};
use crate::types::{PkgError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// AI provider settings
    pub ai: AiConfig,

    /// Package manager settings
    pub cli: CliConfig,

    /// Report output settings
    pub reports: ReportsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            ai: AiConfig::default(),
            cli: CliConfig::default(),
            reports: ReportsConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `PkgError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(PkgError::Config(format!(
                "AI temperature must be between 0.0 and 2.0, got {}",
                self.ai.temperature
            )));
        }

        if self.ai.timeout_secs == 0 {
            return Err(PkgError::Config(
                "AI timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.ai.max_tokens == 0 {
            return Err(PkgError::Config(
                "AI max_tokens must be greater than 0".to_string(),
            ));
        }

        if !(1..=research::MAX_CONCURRENCY).contains(&self.ai.concurrency) {
            return Err(PkgError::Config(format!(
                "AI concurrency must be between 1 and {}, got {}",
                research::MAX_CONCURRENCY,
                self.ai.concurrency
            )));
        }

        if self.cli.binary.trim().is_empty() {
            return Err(PkgError::Config("cli.binary must not be empty".to_string()));
        }

        if self.cli.timeout_secs == 0 {
            return Err(PkgError::Config(
                "cli.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// AI Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Selected provider
    pub provider: ProviderKind,

    /// Model for the Anthropic provider
    pub anthropic_model: String,

    /// Model for the Perplexity provider
    pub perplexity_model: String,

    /// Anthropic key (falls back to ANTHROPIC_API_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,

    /// Perplexity key (falls back to PERPLEXITY_API_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perplexity_api_key: Option<String>,

    /// Token budget per analysis
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,

    /// Provider calls allowed in flight
    pub concurrency: usize,

    /// Endpoint override for the selected provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("AiConfig")
            .field("provider", &self.provider)
            .field("anthropic_model", &self.anthropic_model)
            .field("perplexity_model", &self.perplexity_model)
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("perplexity_api_key", &redact(&self.perplexity_api_key))
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("concurrency", &self.concurrency)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            anthropic_model: provider::ANTHROPIC_DEFAULT_MODEL.to_string(),
            perplexity_model: provider::PERPLEXITY_DEFAULT_MODEL.to_string(),
            anthropic_api_key: None,
            perplexity_api_key: None,
            max_tokens: provider::DEFAULT_MAX_TOKENS,
            temperature: provider::DEFAULT_TEMPERATURE,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            concurrency: research::DEFAULT_CONCURRENCY,
            api_base: None,
        }
    }
}

impl AiConfig {
    /// Provider settings for `kind`, optionally overriding the model
    pub fn provider_config(&self, kind: ProviderKind, model: Option<&str>) -> ProviderConfig {
        let (configured_model, api_key) = match kind {
            ProviderKind::Anthropic => (&self.anthropic_model, &self.anthropic_api_key),
            ProviderKind::Perplexity => (&self.perplexity_model, &self.perplexity_api_key),
        };

        ProviderConfig {
            kind,
            model: Some(model.map(String::from).unwrap_or_else(|| configured_model.clone())),
            api_key: api_key.clone(),
            // The endpoint override only applies to the configured provider
            api_base: if kind == self.provider {
                self.api_base.clone()
            } else {
                None
            },
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout_secs: self.timeout_secs,
        }
    }
}

// =============================================================================
// Package Manager Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Package-manager executable
    pub binary: String,

    /// Time to wait for one invocation (seconds)
    pub timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            binary: cli_constants::DEFAULT_BINARY.to_string(),
            timeout_secs: cli_constants::DEFAULT_TIMEOUT_SECS,
        }
    }
}

// =============================================================================
// Reports Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Directory holding per-package report files
    pub dir: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(report::DEFAULT_DIR),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

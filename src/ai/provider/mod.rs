//! AI Provider Abstraction
//!
//! Defines the `AnalysisProvider` trait over the two remote analysis services:
//!
//! - `anthropic`: model-based reasoning (Messages API)
//! - `perplexity`: web-search augmented reasoning (Chat Completions API)
//!
//! Every call builds its own [`RequestContext`] (URL, headers, body) and hands
//! it to the stateless [`send`] function. The shared `reqwest::Client` carries
//! no per-provider state, so concurrent calls cannot observe each other's
//! credentials.

mod anthropic;
mod perplexity;

pub use anthropic::AnthropicProvider;
pub use perplexity::PerplexityProvider;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ai::timeout::TimeoutConfig;
use crate::constants::provider as provider_constants;
use crate::types::{PkgError, Result};

// =============================================================================
// Provider Selection
// =============================================================================

/// Which remote analysis service to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Model-based reasoning
    #[default]
    Anthropic,
    /// Web-search augmented reasoning
    Perplexity,
}

impl ProviderKind {
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => provider_constants::ANTHROPIC_DEFAULT_MODEL,
            Self::Perplexity => provider_constants::PERPLEXITY_DEFAULT_MODEL,
        }
    }

    /// Environment variable consulted when no key is configured
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Self::Anthropic => provider_constants::ANTHROPIC_KEY_ENV,
            Self::Perplexity => provider_constants::PERPLEXITY_KEY_ENV,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anthropic => write!(f, "anthropic"),
            Self::Perplexity => write!(f, "perplexity"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "perplexity" | "pplx" => Ok(Self::Perplexity),
            _ => Err(format!(
                "Unknown provider: {}. Valid values: anthropic, perplexity",
                s
            )),
        }
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for one provider instance
///
/// API keys are never serialized and are redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type
    pub kind: ProviderKind,
    /// Model name (provider-specific), default when `None`
    pub model: Option<String>,
    /// API key; absent means "not configured"
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL override
    #[serde(default)]
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Sampling temperature (used by the search-augmented provider)
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            model: None,
            api_key: None,
            api_base: None,
            max_tokens: provider_constants::DEFAULT_MAX_TOKENS,
            temperature: provider_constants::DEFAULT_TEMPERATURE,
            timeout_secs: crate::constants::network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    /// Configured key, falling back to the provider's environment variable
    ///
    /// Blank keys count as missing.
    pub fn resolve_api_key(&self) -> Option<SecretString> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(self.kind.key_env_var()).ok())
            .filter(|k| !k.trim().is_empty())
            .map(|k| SecretString::from(k.trim().to_string()))
    }

    pub fn resolve_model(&self) -> String {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.kind.default_model().to_string())
    }
}

// =============================================================================
// Provider Trait
// =============================================================================

/// Remote upgrade-risk analysis service
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Run one analysis and return the provider's text
    ///
    /// Returns an empty string without touching the network when no
    /// credentials are configured.
    async fn analyze(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;
}

/// Shared provider type for concurrent access across a batch.
pub type SharedProvider = Arc<dyn AnalysisProvider>;

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.kind {
        ProviderKind::Anthropic => Ok(Arc::new(AnthropicProvider::new(config.clone())?)),
        ProviderKind::Perplexity => Ok(Arc::new(PerplexityProvider::new(config.clone())?)),
    }
}

// =============================================================================
// Isolated Request Context
// =============================================================================

/// Everything one HTTP call needs, built fresh for each request
#[derive(Debug)]
pub struct RequestContext {
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl RequestContext {
    pub fn new(url: String, body: serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self { url, headers, body }
    }

    /// Add a header; values are marked sensitive so they never show up in logs
    pub fn sensitive_header(mut self, name: &'static str, value: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(value)
            .map_err(|_| PkgError::Config(format!("Invalid characters in {} header", name)))?;
        value.set_sensitive(true);
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }
}

/// POST a request context and return the raw success body
///
/// Non-success statuses become `PkgError::Provider`, network failures
/// become `PkgError::Transport`.
pub async fn send(client: &reqwest::Client, provider: &str, ctx: RequestContext) -> Result<String> {
    debug!("Sending request to {} ({})", provider, ctx.url);

    let response = client
        .post(&ctx.url)
        .headers(ctx.headers)
        .json(&ctx.body)
        .send()
        .await
        .map_err(|e| PkgError::transport(provider, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PkgError::transport(provider, e))?;

    if !status.is_success() {
        warn!("{} returned HTTP {}", provider, status.as_u16());
        return Err(PkgError::provider(provider, status.as_u16(), body));
    }

    Ok(body)
}

/// Build the shared, stateless HTTP client
pub fn http_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeouts.provider_request)
        .connect_timeout(timeouts.connection)
        .build()
        .map_err(|e| PkgError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Validate an API base override, falling back to the provider default
///
/// Only http/https schemes are accepted.
pub fn resolve_api_base(api_base: Option<&str>, default: &str) -> Result<String> {
    let Some(endpoint) = api_base.filter(|b| !b.trim().is_empty()) else {
        return Ok(default.to_string());
    };

    let url = url::Url::parse(endpoint)
        .map_err(|e| PkgError::Config(format!("Invalid API base URL '{}': {}", endpoint, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(PkgError::Config(format!(
            "API base must use http or https scheme, got: {}",
            url.scheme()
        )));
    }

    let mut result = url.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

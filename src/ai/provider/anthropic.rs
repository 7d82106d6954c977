//! Anthropic Messages API Provider
//!
//! Model-based upgrade analysis. Authenticates with `x-api-key` and a pinned
//! `anthropic-version` header.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::{AnalysisProvider, ProviderConfig, RequestContext, http_client, resolve_api_base, send};
use crate::ai::timeout::TimeoutConfig;
use crate::constants::provider as provider_constants;
use crate::types::{PkgError, Result};

const PROVIDER_NAME: &str = "anthropic";

/// Anthropic provider with secure API key handling
pub struct AnthropicProvider {
    /// `None` means the provider is not configured
    api_key: Option<SecretString>,
    api_base: String,
    model: String,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config.resolve_api_key();
        let model = config.resolve_model();
        let api_base = resolve_api_base(
            config.api_base.as_deref(),
            provider_constants::ANTHROPIC_API_BASE,
        )?;
        let client = http_client(&TimeoutConfig::with_provider_secs(config.timeout_secs))?;

        Ok(Self {
            api_key,
            api_base,
            model,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }

    fn request_context(&self, api_key: &SecretString, prompt: &str) -> Result<RequestContext> {
        let body = serde_json::to_value(self.build_request(prompt))?;
        RequestContext::new(format!("{}/messages", self.api_base), body)
            .sensitive_header("x-api-key", api_key.expose_secret())
            .map(|ctx| ctx.header("anthropic-version", provider_constants::ANTHROPIC_VERSION))
    }
}

/// Pull the first text block out of a Messages API response body
fn extract_text(body: &str) -> Result<String> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| PkgError::transport(PROVIDER_NAME, format!("unreadable response: {}", e)))?;

    response
        .content
        .into_iter()
        .find_map(|block| block.text)
        .ok_or_else(|| PkgError::transport(PROVIDER_NAME, "response contained no text"))
}

#[async_trait]
impl AnalysisProvider for AnthropicProvider {
    async fn analyze(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            debug!("Anthropic API key not configured, skipping request");
            return Ok(String::new());
        };

        info!("Analyzing with Anthropic (model: {})", self.model);
        let start = Instant::now();

        let ctx = self.request_context(api_key, prompt)?;
        let body = send(&self.client, PROVIDER_NAME, ctx).await?;
        let text = extract_text(&body)?;

        debug!(
            "Anthropic responded in {:?} ({} chars)",
            start.elapsed(),
            text.len()
        );
        Ok(text)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: usize,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

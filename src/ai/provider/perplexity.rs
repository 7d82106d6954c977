//! Perplexity Chat Completions Provider
//!
//! Web-search augmented analysis. Uses Bearer authentication and appends the
//! returned citations as a source list.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::{AnalysisProvider, ProviderConfig, RequestContext, http_client, resolve_api_base, send};
use crate::ai::timeout::TimeoutConfig;
use crate::constants::provider as provider_constants;
use crate::types::{PkgError, Result};

const PROVIDER_NAME: &str = "perplexity";

const SYSTEM_PROMPT: &str = "You are a software release analyst. Search for the official release notes, changelogs and security advisories of the package in question and cite them. Answer in Markdown.";

/// Perplexity provider with secure API key handling
pub struct PerplexityProvider {
    api_key: Option<SecretString>,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for PerplexityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerplexityProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl PerplexityProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config.resolve_api_key();
        let model = config.resolve_model();
        let api_base = resolve_api_base(
            config.api_base.as_deref(),
            provider_constants::PERPLEXITY_API_BASE,
        )?;
        let client = http_client(&TimeoutConfig::with_provider_secs(config.timeout_secs))?;

        Ok(Self {
            api_key,
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    fn request_context(&self, api_key: &SecretString, prompt: &str) -> Result<RequestContext> {
        let body = serde_json::to_value(self.build_request(prompt))?;
        RequestContext::new(format!("{}/chat/completions", self.api_base), body).sensitive_header(
            "authorization",
            &format!("Bearer {}", api_key.expose_secret()),
        )
    }
}

/// Pull the first choice's content out of a response body, with citations appended
fn extract_text(body: &str) -> Result<String> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| PkgError::transport(PROVIDER_NAME, format!("unreadable response: {}", e)))?;

    let mut text = response
        .choices
        .into_iter()
        .find_map(|c| c.message.content)
        .ok_or_else(|| PkgError::transport(PROVIDER_NAME, "response contained no text"))?;

    if !response.citations.is_empty() {
        text.push_str("\n\n### Sources\n\n");
        for (i, url) in response.citations.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", i + 1, url));
        }
    }

    Ok(text)
}

#[async_trait]
impl AnalysisProvider for PerplexityProvider {
    async fn analyze(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            debug!("Perplexity API key not configured, skipping request");
            return Ok(String::new());
        };

        info!(
            "Analyzing with Perplexity (model: {}, temperature: {})",
            self.model, self.temperature
        );
        let start = Instant::now();

        let ctx = self.request_context(api_key, prompt)?;
        let body = send(&self.client, PROVIDER_NAME, ctx).await?;
        let text = extract_text(&body)?;

        debug!(
            "Perplexity responded in {:?} ({} chars)",
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
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

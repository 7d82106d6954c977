//! AI Integration Layer
//!
//! Provider abstraction, prompt construction and timeouts for upgrade-risk
//! analysis.

pub mod prompt;
pub mod provider;
pub mod timeout;

pub use prompt::{PromptBuilder, PromptSection, SECTION_LABELS, build_prompt};
pub use provider::{
    AnalysisProvider, AnthropicProvider, PerplexityProvider, ProviderConfig, ProviderKind,
    SharedProvider, create_provider,
};
pub use timeout::{TimeoutConfig, with_timeout};

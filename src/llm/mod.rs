//! LLM integration.
//!
//! The pipeline only needs single-turn completions, so the surface is one
//! trait (`LlmProvider`) and one HTTP backend speaking the OpenAI chat
//! completions format. Any API-compatible server can be targeted through
//! `base_url`.

pub mod openai;
pub mod provider;

pub use openai::OpenAiProvider;
pub use provider::*;

use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;

/// Default model used for classification.
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Configuration for creating an LLM provider.
#[derive(Debug)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub base_url: String,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    tracing::info!(
        model = %config.model,
        base_url = %config.base_url,
        "Using OpenAI-compatible provider"
    );
    let provider =
        OpenAiProvider::new(config.api_key, config.base_url, config.model, config.timeout)?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_provider_uses_configured_model() {
        let config = LlmConfig {
            api_key: secrecy::SecretString::from("test-key"),
            model: "gpt-4.1-mini".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        };
        let provider = create_provider(config);
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().model_name(), "gpt-4.1-mini");
    }
}

//! Classifier client: one completion call per message, reduced to a label.
//!
//! Every failure mode (transport, auth, rate limit, timeout, empty or
//! malformed output) comes back as [`Classification::Failed`]. Nothing is
//! retried and nothing propagates to the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::llm::provider::{ChatMessage, CompletionRequest, FinishReason, LlmProvider};
use crate::pipeline::prompt;
use crate::pipeline::types::Classification;

/// Output bound that keeps the model to a single label.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 10;

/// Upper bound on one classification call.
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(15);

/// Tunables for the classification call.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub max_output_tokens: u32,
    /// Unset by default: labels are not assumed to be reproducible.
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: None,
            timeout: DEFAULT_CLASSIFY_TIMEOUT,
        }
    }
}

/// Turns a message into a category candidate via the LLM.
pub struct Classifier {
    llm: Arc<dyn LlmProvider>,
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LlmProvider>, config: ClassifierConfig) -> Self {
        Self { llm, config }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Classify `message`. Never fails; failures are a variant of the result.
    pub async fn classify(&self, message: &str) -> Classification {
        let mut request = CompletionRequest::new(vec![ChatMessage::user(prompt::render(message))])
            .with_max_tokens(self.config.max_output_tokens);
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        let response =
            match tokio::time::timeout(self.config.timeout, self.llm.complete(request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(model = %self.llm.model_name(), error = %e, "Error classifying message");
                    return Classification::Failed {
                        reason: e.to_string(),
                    };
                }
                Err(_) => {
                    warn!(
                        model = %self.llm.model_name(),
                        timeout_ms = self.config.timeout.as_millis() as u64,
                        "Classification timed out"
                    );
                    return Classification::Failed {
                        reason: format!("timed out after {:?}", self.config.timeout),
                    };
                }
            };

        let Some(raw) = response.first_text() else {
            warn!(
                choices = response.choices.len(),
                "Classification returned no usable choice"
            );
            return Classification::Failed {
                reason: "no content in first choice".into(),
            };
        };

        if response
            .choices
            .first()
            .is_some_and(|c| c.finish_reason == FinishReason::Length)
        {
            warn!(
                raw = %raw,
                max_output_tokens = self.config.max_output_tokens,
                "Classification hit the output token cap; label may be cut off"
            );
        }

        let label = normalize_label(raw);
        if label.is_empty() {
            warn!(raw = %raw, "Classification returned blank text");
            return Classification::Failed {
                reason: "blank label".into(),
            };
        }

        debug!(
            raw = %raw,
            label = %label,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Classified message"
        );
        Classification::Label(label)
    }
}

/// Trim surrounding whitespace and lowercase. No other cleanup.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

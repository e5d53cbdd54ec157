//! Message processor: gate → classify → route for one message.
//!
//! Runs strictly sequentially and holds no state between messages, so one
//! processor can be shared by any number of concurrent event tasks.

use tracing::{debug, info};
use uuid::Uuid;

use crate::pipeline::classifier::Classifier;
use crate::pipeline::gate::EventGate;
use crate::pipeline::router::Router;
use crate::pipeline::types::{InboundMessage, PipelineOutcome};

/// The full sorting pipeline.
pub struct MessageProcessor {
    gate: EventGate,
    classifier: Classifier,
    router: Router,
}

impl MessageProcessor {
    pub fn new(gate: EventGate, classifier: Classifier, router: Router) -> Self {
        Self {
            gate,
            classifier,
            router,
        }
    }

    /// Process a single inbound message through the pipeline.
    pub async fn process(&self, message: InboundMessage) -> PipelineOutcome {
        let run_id = Uuid::new_v4();

        let text = match self.gate.admit(&message) {
            Ok(text) => text,
            Err(rejection) => {
                debug!(
                    run_id = %run_id,
                    channel = message.source_channel_id.as_deref().unwrap_or("-"),
                    reason = rejection.label(),
                    "Event rejected by gate"
                );
                return PipelineOutcome::Rejected(rejection);
            }
        };

        info!(
            run_id = %run_id,
            ts = message.ts.as_deref().unwrap_or("-"),
            user = message.user.as_deref().unwrap_or("-"),
            "Processing inbound message"
        );

        let classification = self.classifier.classify(text).await;
        let outcome = self
            .router
            .route(classification, text, self.gate.source_channel_id())
            .await;

        info!(run_id = %run_id, outcome = outcome.label(), "Pipeline finished");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::LlmError;
    use crate::llm::provider::{
        CompletionChoice, CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
    };
    use crate::pipeline::classifier::ClassifierConfig;
    use crate::pipeline::testing::RecordingPoster;
    use crate::pipeline::types::{Category, ChannelMap, GateRejection, Routed};

    const SOURCE: &str = "C_GENERAL";
    const CANDIDATE_CHANNEL: &str = "C_CANDIDATES";
    const SCENARIO_TEXT: &str = "Found a cool DevRel on Twitter who knows our stack inside out.";

    /// Mock LLM returning a fixed label, or a network error when `None`.
    struct MockSortLlm {
        label: Option<String>,
    }

    #[async_trait::async_trait]
    impl LlmProvider for MockSortLlm {
        fn model_name(&self) -> &str {
            "mock-sort"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            match &self.label {
                Some(label) => Ok(CompletionResponse {
                    choices: vec![CompletionChoice {
                        content: Some(label.clone()),
                        finish_reason: FinishReason::Stop,
                    }],
                    input_tokens: 600,
                    output_tokens: 4,
                }),
                None => Err(LlmError::RequestFailed {
                    provider: "mock".into(),
                    reason: "network unreachable".into(),
                }),
            }
        }
    }

    fn processor(label: Option<&str>, poster: Arc<RecordingPoster>) -> MessageProcessor {
        let llm = Arc::new(MockSortLlm {
            label: label.map(String::from),
        });
        let channels = ChannelMap::from_fn(|c| match c {
            Category::CandidateSourcing => Some(CANDIDATE_CHANNEL.into()),
            other => Some(format!("C_{}", other.label())),
        });
        MessageProcessor::new(
            EventGate::new(SOURCE),
            Classifier::new(llm, ClassifierConfig::default()),
            Router::new(channels, poster),
        )
    }

    fn human_message(text: &str) -> InboundMessage {
        InboundMessage {
            source_channel_id: Some(SOURCE.into()),
            author_is_bot: false,
            text: text.into(),
            ts: Some("1700000000.000100".into()),
            user: Some("U123".into()),
        }
    }

    #[tokio::test]
    async fn scenario_routes_candidate_message() {
        let poster = Arc::new(RecordingPoster::new());
        let outcome = processor(Some("candidate-sourcing"), poster.clone())
            .process(human_message(SCENARIO_TEXT))
            .await;

        assert_eq!(
            outcome,
            PipelineOutcome::Routed(Routed {
                category: Category::CandidateSourcing,
                destination: Some(CANDIDATE_CHANNEL.into()),
                delivered: true,
                confirmed: true,
            })
        );
        assert_eq!(
            poster.posts(),
            vec![
                (
                    CANDIDATE_CHANNEL.to_string(),
                    "*[Auto-sorted from #general]*\nFound a cool DevRel on Twitter who knows our stack inside out."
                        .to_string(),
                ),
                (
                    SOURCE.to_string(),
                    "Message sorted to #candidate-sourcing".to_string(),
                ),
            ]
        );
    }

    #[tokio::test]
    async fn network_error_posts_nothing() {
        let poster = Arc::new(RecordingPoster::new());
        let outcome = processor(None, poster.clone())
            .process(human_message(SCENARIO_TEXT))
            .await;
        assert!(matches!(outcome, PipelineOutcome::Failed { .. }));
        assert!(poster.posts().is_empty());
    }

    #[tokio::test]
    async fn mixed_case_label_is_normalized_before_routing() {
        let poster = Arc::new(RecordingPoster::new());
        let outcome = processor(Some("Candidate-Sourcing "), poster.clone())
            .process(human_message(SCENARIO_TEXT))
            .await;
        assert!(matches!(
            outcome,
            PipelineOutcome::Routed(Routed {
                category: Category::CandidateSourcing,
                ..
            })
        ));
        assert_eq!(poster.posts()[0].0, CANDIDATE_CHANNEL);
        assert_eq!(poster.posts()[1].1, "Message sorted to #candidate-sourcing");
    }

    #[tokio::test]
    async fn unknown_label_posts_nothing() {
        let poster = Arc::new(RecordingPoster::new());
        let outcome = processor(Some("general-chat"), poster.clone())
            .process(human_message("lunch at noon?"))
            .await;
        assert_eq!(
            outcome,
            PipelineOutcome::Dropped {
                label: "general-chat".into()
            }
        );
        assert!(poster.posts().is_empty());
    }

    #[tokio::test]
    async fn gate_rejections_post_nothing() {
        let cases = [
            (
                InboundMessage {
                    source_channel_id: Some("C_RANDOM".into()),
                    ..human_message("hello")
                },
                GateRejection::WrongChannel,
            ),
            (
                InboundMessage {
                    author_is_bot: true,
                    ..human_message("Message sorted to #marketing-pitch")
                },
                GateRejection::BotAuthor,
            ),
            (human_message(""), GateRejection::EmptyText),
        ];

        for (message, expected) in cases {
            let poster = Arc::new(RecordingPoster::new());
            let outcome = processor(Some("marketing-pitch"), poster.clone())
                .process(message)
                .await;
            assert_eq!(outcome, PipelineOutcome::Rejected(expected));
            assert!(poster.posts().is_empty());
        }
    }
}

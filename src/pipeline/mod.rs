//! Message sorting pipeline.
//!
//! Every inbound message flows through:
//! 1. `EventGate::admit()`: source channel, human author, non-empty text
//! 2. `Classifier::classify()`: few-shot LLM call reduced to a label
//! 3. `Router::route()`: label → destination channel, forward + confirmation
//!
//! Unknown labels and failed classifications end the run with no posts.

pub mod classifier;
pub mod gate;
pub mod processor;
pub mod prompt;
pub mod router;
pub mod types;

pub use classifier::{Classifier, ClassifierConfig};
pub use gate::EventGate;
pub use processor::MessageProcessor;
pub use router::{ConfirmPolicy, Router};
pub use types::*;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::ChannelError;
    use crate::pipeline::types::MessagePoster;

    /// Poster that records accepted posts and can refuse one channel.
    pub struct RecordingPoster {
        posts: Mutex<Vec<(String, String)>>,
        failing_channel: Option<String>,
    }

    impl RecordingPoster {
        pub fn new() -> Self {
            Self {
                posts: Mutex::new(Vec::new()),
                failing_channel: None,
            }
        }

        pub fn failing_for(channel: &str) -> Self {
            Self {
                failing_channel: Some(channel.to_string()),
                ..Self::new()
            }
        }

        pub fn posts(&self) -> Vec<(String, String)> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessagePoster for RecordingPoster {
        fn name(&self) -> &str {
            "recording"
        }

        async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChannelError> {
            if self.failing_channel.as_deref() == Some(channel) {
                return Err(ChannelError::SendFailed {
                    name: "recording".into(),
                    reason: "channel_not_found".into(),
                });
            }
            self.posts
                .lock()
                .unwrap()
                .push((channel.to_string(), text.to_string()));
            Ok(())
        }
    }
}

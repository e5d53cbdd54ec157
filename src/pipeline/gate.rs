//! Event gate: decides whether an inbound message enters the pipeline.
//!
//! Only human-authored, non-empty messages posted in the monitored source
//! channel are admitted. Everything else is dropped without side effects.

use crate::pipeline::types::{GateRejection, InboundMessage};

/// Filters inbound messages down to the monitored source channel.
#[derive(Debug, Clone)]
pub struct EventGate {
    source_channel_id: String,
}

impl EventGate {
    pub fn new(source_channel_id: impl Into<String>) -> Self {
        Self {
            source_channel_id: source_channel_id.into(),
        }
    }

    pub fn source_channel_id(&self) -> &str {
        &self.source_channel_id
    }

    /// Return the message text if the message should be sorted.
    pub fn admit<'a>(&self, message: &'a InboundMessage) -> Result<&'a str, GateRejection> {
        if message.source_channel_id.as_deref() != Some(self.source_channel_id.as_str()) {
            return Err(GateRejection::WrongChannel);
        }
        if message.author_is_bot {
            return Err(GateRejection::BotAuthor);
        }
        if message.text.is_empty() {
            return Err(GateRejection::EmptyText);
        }
        Ok(&message.text)
    }
}

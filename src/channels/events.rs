//! Slack Events API payloads.

use serde::Deserialize;

use crate::pipeline::types::InboundMessage;

/// Top-level body POSTed by the Events API.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Endpoint ownership check sent when the request URL is configured.
    UrlVerification { challenge: String },
    /// A subscribed event.
    EventCallback {
        event: MessageEvent,
        #[serde(default)]
        event_id: Option<String>,
        #[serde(default)]
        team_id: Option<String>,
    },
    /// Rate-limit notices, app uninstall, and anything newer.
    #[serde(other)]
    Other,
}

/// Inner event of an `event_callback`. Only the fields the pipeline reads
/// are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

impl MessageEvent {
    pub fn is_message(&self) -> bool {
        self.kind == "message"
    }
}

impl From<MessageEvent> for InboundMessage {
    fn from(event: MessageEvent) -> Self {
        Self {
            source_channel_id: event.channel,
            author_is_bot: event.bot_id.is_some(),
            text: event.text.unwrap_or_default(),
            ts: event.ts,
            user: event.user,
        }
    }
}

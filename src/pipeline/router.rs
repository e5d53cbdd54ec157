//! Router: resolves a label to a destination channel and posts.
//!
//! Unknown labels fail closed: nothing is posted anywhere, not even a notice
//! in the source channel. Post failures are logged and never retried.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::pipeline::types::{
    Category, ChannelMap, Classification, MessagePoster, PipelineOutcome, Routed,
};

/// Source channel name used in the provenance annotation.
pub const DEFAULT_SOURCE_CHANNEL_NAME: &str = "general";

/// When to post the confirmation back to the source channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfirmPolicy {
    /// Confirm whenever the label resolves, even if the destination is
    /// unconfigured or the forward failed.
    #[default]
    Always,
    /// Confirm only after the destination post succeeded.
    OnDelivery,
}

impl FromStr for ConfirmPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "on-delivery" | "on_delivery" => Ok(Self::OnDelivery),
            other => Err(ConfigError::InvalidValue {
                key: "SORTER_CONFIRM_POLICY".into(),
                message: format!("expected 'always' or 'on-delivery', got '{other}'"),
            }),
        }
    }
}

/// Forwards classified messages to their category channel.
pub struct Router {
    channels: ChannelMap,
    poster: Arc<dyn MessagePoster>,
    source_channel_name: String,
    confirm_policy: ConfirmPolicy,
}

impl Router {
    pub fn new(channels: ChannelMap, poster: Arc<dyn MessagePoster>) -> Self {
        Self {
            channels,
            poster,
            source_channel_name: DEFAULT_SOURCE_CHANNEL_NAME.to_string(),
            confirm_policy: ConfirmPolicy::default(),
        }
    }

    pub fn with_source_channel_name(mut self, name: impl Into<String>) -> Self {
        self.source_channel_name = name.into();
        self
    }

    pub fn with_confirm_policy(mut self, policy: ConfirmPolicy) -> Self {
        self.confirm_policy = policy;
        self
    }

    /// Body posted to the destination channel.
    pub fn forwarded_text(&self, text: &str) -> String {
        format!("*[Auto-sorted from #{}]*\n{}", self.source_channel_name, text)
    }

    /// Body posted back to the source channel.
    pub fn confirmation_text(category: Category) -> String {
        format!("Message sorted to #{category}")
    }

    /// Route one classified message.
    pub async fn route(
        &self,
        classification: Classification,
        text: &str,
        source_channel_id: &str,
    ) -> PipelineOutcome {
        let label = match classification {
            Classification::Label(label) => label,
            Classification::Failed { reason } => {
                info!(reason = %reason, "No category returned from classification");
                return PipelineOutcome::Failed { reason };
            }
        };

        let Some(category) = Category::from_label(&label) else {
            debug!(label = %label, "Unknown category, dropping message");
            return PipelineOutcome::Dropped { label };
        };

        info!(category = %category, "Classified category");

        let destination = self.channels.destination(category).map(String::from);
        let delivered = match destination.as_deref() {
            Some(channel) => self.post(channel, &self.forwarded_text(text)).await,
            None => {
                warn!(
                    category = %category,
                    "No destination channel configured, skipping forward"
                );
                false
            }
        };

        let confirmed = match self.confirm_policy {
            ConfirmPolicy::OnDelivery if !delivered => {
                debug!(category = %category, "Forward not delivered, skipping confirmation");
                false
            }
            _ => {
                self.post(source_channel_id, &Self::confirmation_text(category))
                    .await
            }
        };

        PipelineOutcome::Routed(Routed {
            category,
            destination,
            delivered,
            confirmed,
        })
    }

    async fn post(&self, channel: &str, text: &str) -> bool {
        match self.poster.post_message(channel, text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    platform = self.poster.name(),
                    channel = %channel,
                    error = %e,
                    "Failed to post message"
                );
                false
            }
        }
    }
}

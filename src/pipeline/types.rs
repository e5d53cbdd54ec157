//! Shared types for the sorting pipeline.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

// ── Category ────────────────────────────────────────────────────────

/// The closed set of topics a message can be sorted into.
///
/// The wire label is the exact lowercase kebab-case name the model is asked
/// to produce. Parsing is exact: no trimming, no case folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    FounderSourcing,
    CandidateSourcing,
    MarketingIdeasFinding,
    MarketingPitch,
}

impl Category {
    /// Every category, in prompt order.
    pub const ALL: [Category; 4] = [
        Category::FounderSourcing,
        Category::CandidateSourcing,
        Category::MarketingIdeasFinding,
        Category::MarketingPitch,
    ];

    /// Wire label, also used as the channel name in confirmations.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FounderSourcing => "founder-sourcing",
            Self::CandidateSourcing => "candidate-sourcing",
            Self::MarketingIdeasFinding => "marketing-ideas-finding",
            Self::MarketingPitch => "marketing-pitch",
        }
    }

    /// Exact, case-sensitive lookup of a wire label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Channel map ─────────────────────────────────────────────────────

/// Destination channel per category.
///
/// One slot per variant, so a category can never be missing from the map.
/// A slot may still be empty, in which case routing to it posts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMap {
    founder_sourcing: Option<String>,
    candidate_sourcing: Option<String>,
    marketing_ideas_finding: Option<String>,
    marketing_pitch: Option<String>,
}

impl ChannelMap {
    /// Build a map by asking `lookup` for each category's channel id.
    /// Blank ids are stored as absent.
    pub fn from_fn<F>(mut lookup: F) -> Self
    where
        F: FnMut(Category) -> Option<String>,
    {
        let mut slot = |category| {
            lookup(category)
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
        };
        Self {
            founder_sourcing: slot(Category::FounderSourcing),
            candidate_sourcing: slot(Category::CandidateSourcing),
            marketing_ideas_finding: slot(Category::MarketingIdeasFinding),
            marketing_pitch: slot(Category::MarketingPitch),
        }
    }

    /// Destination channel for `category`, if one is configured.
    pub fn destination(&self, category: Category) -> Option<&str> {
        let slot = match category {
            Category::FounderSourcing => &self.founder_sourcing,
            Category::CandidateSourcing => &self.candidate_sourcing,
            Category::MarketingIdeasFinding => &self.marketing_ideas_finding,
            Category::MarketingPitch => &self.marketing_pitch,
        };
        slot.as_deref()
    }

    /// Categories with no destination configured.
    pub fn unconfigured(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.destination(*c).is_none())
            .collect()
    }
}

// ── Inbound message ─────────────────────────────────────────────────

/// A message event as seen by the pipeline.
///
/// Transport adapters convert their native event into this struct.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    /// Channel the event was posted in, if the event carried one.
    pub source_channel_id: Option<String>,
    /// Set when the event carries an automated-author marker.
    pub author_is_bot: bool,
    /// Raw message text, possibly empty.
    pub text: String,
    /// Platform timestamp, for log correlation only.
    pub ts: Option<String>,
    /// Posting user, for log correlation only.
    pub user: Option<String>,
}

// ── Classification ──────────────────────────────────────────────────

/// Result of a classification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Normalized (trimmed, lowercased) model output. Not yet validated
    /// against [`Category`].
    Label(String),
    /// The call failed or produced nothing usable.
    Failed { reason: String },
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Why the gate refused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    WrongChannel,
    BotAuthor,
    EmptyText,
}

impl GateRejection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::WrongChannel => "wrong_channel",
            Self::BotAuthor => "bot_author",
            Self::EmptyText => "empty_text",
        }
    }
}

/// Details of a message that reached the routing step with a known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    pub category: Category,
    /// Channel the message was forwarded to, if one is configured.
    pub destination: Option<String>,
    /// The destination post went out and the platform accepted it.
    pub delivered: bool,
    /// The confirmation went out to the source channel.
    pub confirmed: bool,
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The gate refused the event. No classification was attempted.
    Rejected(GateRejection),
    /// Classification failed. Nothing was posted.
    Failed { reason: String },
    /// The model produced a label outside the category set. Nothing was posted.
    Dropped { label: String },
    /// The label resolved to a category.
    Routed(Routed),
}

impl PipelineOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "rejected",
            Self::Failed { .. } => "failed",
            Self::Dropped { .. } => "dropped",
            Self::Routed(_) => "routed",
        }
    }
}

// ── Outbound trait ──────────────────────────────────────────────────

/// Outbound side of the chat platform: pure I/O, no routing logic.
#[async_trait]
pub trait MessagePoster: Send + Sync {
    /// Platform name for logs (e.g. "slack").
    fn name(&self) -> &str;

    /// Post `text` to `channel`.
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_round_trips() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
    }

    #[test]
    fn label_lookup_is_exact() {
        assert_eq!(Category::from_label("Candidate-Sourcing"), None);
        assert_eq!(Category::from_label("candidate-sourcing."), None);
        assert_eq!(Category::from_label(" candidate-sourcing"), None);
        assert_eq!(Category::from_label("candidate sourcing"), None);
        assert_eq!(Category::from_label("general-chat"), None);
        assert_eq!(Category::from_label(""), None);
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_value(Category::MarketingIdeasFinding).unwrap();
        assert_eq!(json, "marketing-ideas-finding");
    }

    #[test]
    fn channel_map_covers_every_category() {
        let map = ChannelMap::from_fn(|c| Some(format!("C-{}", c.label())));
        for category in Category::ALL {
            assert_eq!(
                map.destination(category),
                Some(format!("C-{}", category.label()).as_str())
            );
        }
        assert!(map.unconfigured().is_empty());
    }

    #[test]
    fn channel_map_treats_blank_ids_as_absent() {
        let map = ChannelMap::from_fn(|c| match c {
            Category::FounderSourcing => Some("   ".into()),
            Category::MarketingPitch => None,
            _ => Some("C123".into()),
        });
        assert_eq!(map.destination(Category::FounderSourcing), None);
        assert_eq!(map.destination(Category::MarketingPitch), None);
        assert_eq!(map.destination(Category::CandidateSourcing), Some("C123"));
        assert_eq!(
            map.unconfigured(),
            vec![Category::FounderSourcing, Category::MarketingPitch]
        );
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(
            PipelineOutcome::Rejected(GateRejection::BotAuthor).label(),
            "rejected"
        );
        assert_eq!(
            PipelineOutcome::Failed { reason: "x".into() }.label(),
            "failed"
        );
        assert_eq!(
            PipelineOutcome::Dropped { label: "x".into() }.label(),
            "dropped"
        );
    }
}

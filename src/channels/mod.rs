//! Slack integration: inbound event payloads, request signing, outbound posts.

pub mod events;
pub mod signature;
pub mod slack;

pub use events::{EventEnvelope, MessageEvent};
pub use slack::SlackClient;

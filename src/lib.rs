//! Channel sorter: classifies messages posted to a Slack source channel and
//! forwards them to the matching destination channel.

pub mod channels;
pub mod config;
pub mod error;
pub mod eval;
pub mod llm;
pub mod pipeline;
pub mod server;

//! Configuration types, read from the environment.
//!
//! Every loader takes a lookup function so tests can supply a map instead of
//! mutating the process environment.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::channels::slack::DEFAULT_API_BASE;
use crate::error::ConfigError;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, LlmConfig};
use crate::pipeline::router::DEFAULT_SOURCE_CHANNEL_NAME;
use crate::pipeline::{Category, ChannelMap, ClassifierConfig, ConfirmPolicy};

/// Default HTTP port for the webhook server.
pub const DEFAULT_PORT: u16 = 3000;

/// Timeout for Slack Web API calls.
pub const SLACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding the destination channel for `category`.
pub fn channel_env_var(category: Category) -> &'static str {
    match category {
        Category::FounderSourcing => "FOUNDER_CHANNEL_ID",
        Category::CandidateSourcing => "CANDIDATE_CHANNEL_ID",
        Category::MarketingIdeasFinding => "MARKETING_FINDING_IDEAS_CHANNEL_ID",
        Category::MarketingPitch => "MARKETING_PITCH_CHANNEL_ID",
    }
}

/// Settings for the classification call.
#[derive(Debug)]
pub struct ClassifierSettings {
    pub llm: LlmConfig,
    pub classifier: ClassifierConfig,
}

impl ClassifierSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let defaults = ClassifierConfig::default();

        let timeout = env
            .parse::<u64>("SORTER_CLASSIFY_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        if timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "SORTER_CLASSIFY_TIMEOUT_SECS".into(),
                message: "must be greater than zero".into(),
            });
        }

        let max_output_tokens = env
            .parse::<u32>("SORTER_MAX_OUTPUT_TOKENS")?
            .unwrap_or(defaults.max_output_tokens);
        if max_output_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SORTER_MAX_OUTPUT_TOKENS".into(),
                message: "must be greater than zero".into(),
            });
        }

        let temperature = env.parse::<f32>("SORTER_TEMPERATURE")?;
        if temperature.is_some() {
            tracing::info!(
                ?temperature,
                "Classification temperature pinned; labels may become reproducible"
            );
        }

        Ok(Self {
            llm: LlmConfig {
                api_key: env.secret("OPENAI_API_KEY")?,
                model: env.optional("SORTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
                base_url: env
                    .optional("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
                timeout,
            },
            classifier: ClassifierConfig {
                max_output_tokens,
                temperature,
                timeout,
            },
        })
    }
}

/// Settings for the webhook server and Slack side of the pipeline.
#[derive(Debug)]
pub struct ServerConfig {
    pub slack_bot_token: SecretString,
    pub slack_signing_secret: SecretString,
    pub slack_api_base: String,
    pub source_channel_id: String,
    /// Display name used in the provenance annotation.
    pub source_channel_name: String,
    pub channels: ChannelMap,
    pub confirm_policy: ConfirmPolicy,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let confirm_policy = match env.optional("SORTER_CONFIRM_POLICY") {
            Some(raw) => raw.parse()?,
            None => ConfirmPolicy::default(),
        };

        Ok(Self {
            slack_bot_token: env.secret("SLACK_BOT_TOKEN")?,
            slack_signing_secret: env.secret("SLACK_SIGNING_SECRET")?,
            slack_api_base: env
                .optional("SLACK_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.into()),
            source_channel_id: env.required("SOURCE_CHANNEL_ID")?,
            source_channel_name: env
                .optional("SOURCE_CHANNEL_NAME")
                .map(|name| name.trim_start_matches('#').to_string())
                .unwrap_or_else(|| DEFAULT_SOURCE_CHANNEL_NAME.into()),
            channels: ChannelMap::from_fn(|category| env.optional(channel_env_var(category))),
            confirm_policy,
            port: env.parse::<u16>("PORT")?.unwrap_or(DEFAULT_PORT),
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Lookup wrapper that treats blank values as unset.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        self.required(key).map(SecretString::from)
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("'{raw}': {e}"),
                })
            })
            .transpose()
    }
}

//! Slack Web API client for outbound posts.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::ChannelError;
use crate::pipeline::types::MessagePoster;

/// Default Web API base.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

const NAME: &str = "slack";

/// Slack Web API client authenticated with a bot token.
pub struct SlackClient {
    client: reqwest::Client,
    bot_token: SecretString,
    api_base: String,
}

impl SlackClient {
    pub fn new(
        bot_token: SecretString,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChannelError::Http(e.to_string()))?;
        Ok(Self {
            client,
            bot_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base)
    }
}

/// Common envelope of every Web API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl MessagePoster for SlackClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "channel": channel,
            "text": text,
        });

        let resp = self
            .client
            .post(self.api_url("chat.postMessage"))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: NAME.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ChannelError::RateLimited { name: NAME.into() });
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: NAME.into(),
                reason: format!("HTTP {status}: {text}"),
            });
        }

        let api: ApiResponse = resp.json().await.map_err(|e| ChannelError::SendFailed {
            name: NAME.into(),
            reason: format!("invalid response: {e}"),
        })?;

        check_api_response(api)?;
        debug!(channel = %channel, "Posted message");
        Ok(())
    }
}

/// Slack reports most failures as `200 {"ok": false, "error": "..."}`.
fn check_api_response(api: ApiResponse) -> Result<(), ChannelError> {
    if api.ok {
        return Ok(());
    }
    let error = api.error.unwrap_or_else(|| "unknown_error".to_string());
    match error.as_str() {
        "ratelimited" => Err(ChannelError::RateLimited { name: NAME.into() }),
        "invalid_auth" | "not_authed" | "account_inactive" | "token_revoked" => {
            Err(ChannelError::AuthFailed {
                name: NAME.into(),
                reason: error,
            })
        }
        _ => Err(ChannelError::SendFailed {
            name: NAME.into(),
            reason: error,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ApiResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn ok_response_passes() {
        let api = parse(r#"{"ok": true, "channel": "C1", "ts": "1700000000.0001"}"#);
        assert!(check_api_response(api).is_ok());
    }

    #[test]
    fn channel_not_found_is_send_failure() {
        let api = parse(r#"{"ok": false, "error": "channel_not_found"}"#);
        match check_api_response(api) {
            Err(ChannelError::SendFailed { reason, .. }) => assert_eq!(reason, "channel_not_found"),
            other => panic!("Expected SendFailed, got {:?}", other),
        }
    }

    #[test]
    fn invalid_auth_is_auth_failure() {
        let api = parse(r#"{"ok": false, "error": "invalid_auth"}"#);
        assert!(matches!(
            check_api_response(api),
            Err(ChannelError::AuthFailed { .. })
        ));
    }

    #[test]
    fn ratelimited_error_maps_to_rate_limit() {
        let api = parse(r#"{"ok": false, "error": "ratelimited"}"#);
        assert!(matches!(
            check_api_response(api),
            Err(ChannelError::RateLimited { .. })
        ));
    }

    #[test]
    fn missing_error_field_still_fails() {
        let api = parse(r#"{"ok": false}"#);
        assert!(check_api_response(api).is_err());
    }

    #[test]
    fn api_url_joins_method() {
        let client = SlackClient::new(
            SecretString::from("xoxb-test"),
            "http://127.0.0.1:9999/api/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.api_url("chat.postMessage"),
            "http://127.0.0.1:9999/api/chat.postMessage"
        );
    }
}

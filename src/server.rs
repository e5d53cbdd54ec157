//! Webhook server for the Slack Events API.
//!
//! `POST /slack/events` authenticates the request, answers URL verification,
//! and hands message events to the pipeline on a spawned task so Slack gets
//! its acknowledgment without waiting on the model. `GET /` is a liveness
//! check.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use secrecy::{ExposeSecret, SecretString};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::channels::events::EventEnvelope;
use crate::channels::signature::{self, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::error::SignatureError;
use crate::pipeline::{InboundMessage, MessageProcessor};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    processor: Arc<MessageProcessor>,
    signing_secret: Arc<SecretString>,
}

impl AppState {
    pub fn new(processor: Arc<MessageProcessor>, signing_secret: SecretString) -> Self {
        Self {
            processor,
            signing_secret: Arc::new(signing_secret),
        }
    }
}

/// Build the axum router.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/slack/events", post(slack_events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "channel-sorter is running"
}

async fn slack_events(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(e) = authenticate(&state, &headers, &body) {
        warn!(error = %e, "Rejected Slack request");
        return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
    }

    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Invalid Slack event payload");
            return (StatusCode::BAD_REQUEST, "invalid payload").into_response();
        }
    };

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            debug!("Answering URL verification");
            ([(header::CONTENT_TYPE, "text/plain")], challenge).into_response()
        }
        EventEnvelope::EventCallback {
            event, event_id, ..
        } => {
            if event.is_message() {
                let processor = Arc::clone(&state.processor);
                let message = InboundMessage::from(event);
                tokio::spawn(async move {
                    processor.process(message).await;
                });
            } else {
                debug!(
                    kind = %event.kind,
                    event_id = event_id.as_deref().unwrap_or("-"),
                    "Ignoring non-message event"
                );
            }
            StatusCode::OK.into_response()
        }
        EventEnvelope::Other => StatusCode::OK.into_response(),
    }
}

fn authenticate(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), SignatureError> {
    let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
    let sig = header_str(headers, SIGNATURE_HEADER)?;
    signature::verify(
        state.signing_secret.expose_secret().as_bytes(),
        timestamp,
        sig,
        body,
        chrono::Utc::now().timestamp(),
    )
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    let value = headers
        .get(name)
        .ok_or(SignatureError::MissingHeader(name))?;
    value.to_str().map_err(|_| SignatureError::MalformedHeader {
        header: name,
        reason: "not visible ASCII".into(),
    })
}

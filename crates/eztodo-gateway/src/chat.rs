//! The chat controller: resolve the provider, assemble the conversation,
//! dispatch, and flatten the outcome into a [`GatewayResult`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, SecondsFormat, Utc};
use eztodo_agents::{ChatMessage, CompletionRequest, ContextCounts, Conversation};
use eztodo_common::{Error, ErrorKind, Result};
use eztodo_config::ResolvedConfig;
use eztodo_security::redact_secrets;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::state::AppState;

/// User-facing text returned with every failure.
pub const APOLOGY: &str = "Sorry, the AI assistant is temporarily unable to respond. \
                           Please check the configuration or try again later.";

/// Inbound chat request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<ChatMessage>,
    /// Task summaries; only their count is used.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub todos: Vec<serde_json::Value>,
    /// Plan summaries; only their count is used.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub plans: Vec<serde_json::Value>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: Vec::new(),
            todos: Vec::new(),
            plans: Vec::new(),
        }
    }

    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::MalformedRequest(e.to_string()))
    }

    pub fn counts(&self) -> ContextCounts {
        ContextCounts {
            todos: self.todos.len(),
            plans: self.plans.len(),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of one chat request. This, not an error, is what callers see.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResult {
    Success {
        response: String,
        meta: SuccessMeta,
    },
    Failure {
        error: String,
        response: String,
        meta: FailureMeta,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessMeta {
    #[serde(rename = "aiService")]
    pub provider: String,
    #[serde(rename = "hasApiKey")]
    pub has_credential: bool,
    #[serde(serialize_with = "rfc3339")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureMeta {
    #[serde(serialize_with = "rfc3339")]
    pub timestamp: DateTime<Utc>,
    pub kind: ErrorKind,
    pub environment: String,
}

fn rfc3339<S: serde::Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl GatewayResult {
    pub fn success(response: String, resolved: &ResolvedConfig) -> Self {
        GatewayResult::Success {
            response,
            meta: SuccessMeta {
                provider: resolved.provider.clone(),
                has_credential: resolved.has_credential(),
                timestamp: Utc::now(),
            },
        }
    }

    pub fn failure(err: &Error, environment: &str) -> Self {
        GatewayResult::Failure {
            error: err.to_string(),
            response: APOLOGY.to_string(),
            meta: FailureMeta {
                timestamp: Utc::now(),
                kind: err.kind(),
                environment: environment.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GatewayResult::Success { .. })
    }

    /// Error kind of a failure, `None` on success.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            GatewayResult::Success { .. } => None,
            GatewayResult::Failure { meta, .. } => Some(meta.kind),
        }
    }

    /// The reply text on success, the apology on failure.
    pub fn response(&self) -> &str {
        match self {
            GatewayResult::Success { response, .. } | GatewayResult::Failure { response, .. } => {
                response
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_success() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Wire body: `{success, response, debug}` plus `error` on failure.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            GatewayResult::Success { response, meta } => serde_json::json!({
                "success": true,
                "response": response,
                "debug": meta,
            }),
            GatewayResult::Failure {
                error,
                response,
                meta,
            } => serde_json::json!({
                "success": false,
                "error": error,
                "response": response,
                "debug": meta,
            }),
        }
    }
}

impl IntoResponse for GatewayResult {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

/// Handle a raw request body. Unparsable bodies become `MalformedRequest`
/// failures rather than transport-level rejections.
pub async fn handle_body(state: &AppState, body: &[u8]) -> GatewayResult {
    match ChatRequest::from_slice(body) {
        Ok(request) => handle(state, &request).await,
        Err(err) => fail(state, err),
    }
}

/// A body that could not be read at all (too large, aborted). Reported the
/// same way as one that could not be parsed.
pub fn reject_body(state: &AppState, reason: String) -> GatewayResult {
    fail(state, Error::MalformedRequest(reason))
}

/// Run one chat request through resolve → assemble → dispatch.
#[instrument(skip_all, fields(history = request.history.len()))]
pub async fn handle(state: &AppState, request: &ChatRequest) -> GatewayResult {
    match run(state, request).await {
        Ok((resolved, reply)) => {
            info!(provider = %resolved.provider, "chat request succeeded");
            GatewayResult::success(reply, &resolved)
        }
        Err(err) => fail(state, err),
    }
}

async fn run(state: &AppState, request: &ChatRequest) -> Result<(ResolvedConfig, String)> {
    let resolved = state.resolve();
    debug!(
        provider = %resolved.provider,
        has_credential = resolved.has_credential(),
        "config resolved"
    );

    let counts = request.counts();
    let conversation = Conversation::assemble(&request.message, &request.history, counts);
    debug!(messages = conversation.len(), "conversation assembled");

    let provider = state.providers.get(&resolved.provider)?;
    debug!(provider = provider.provider_id(), "dispatching");

    let reply = provider
        .complete(&CompletionRequest {
            conversation: &conversation,
            credential: resolved.credential.as_deref(),
            counts,
        })
        .await?;

    Ok((resolved, reply))
}

fn fail(state: &AppState, err: Error) -> GatewayResult {
    warn!(
        kind = ?err.kind(),
        "chat request failed: {}",
        redact_secrets(&err.to_string())
    );
    GatewayResult::failure(&err, &state.config.gateway.environment)
}

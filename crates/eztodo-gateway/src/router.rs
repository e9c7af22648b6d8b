use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chat::{self, GatewayResult};
use crate::state::SharedState;

/// Largest chat body accepted. Bigger bodies get the malformed-request
/// failure instead of a bare 413.
pub const MAX_CHAT_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Build the application router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route(
            "/api/ai/chat",
            post(chat_handler).layer(DefaultBodyLimit::max(MAX_CHAT_BODY_BYTES)),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "ok"
}

/// GET /api/status: which provider a request would use right now.
async fn status(State(state): State<SharedState>) -> axum::Json<serde_json::Value> {
    let resolved = state.resolve();
    axum::Json(serde_json::json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": resolved.provider,
        "hasApiKey": resolved.has_credential(),
        "providers": state.providers.provider_ids(),
    }))
}

/// POST /api/ai/chat. The body is parsed by the controller so that a bad
/// body yields the normal failure shape.
async fn chat_handler(
    State(state): State<SharedState>,
    body: Result<Bytes, BytesRejection>,
) -> GatewayResult {
    match body {
        Ok(body) => chat::handle_body(&state, &body).await,
        Err(rejection) => chat::reject_body(&state, rejection.body_text()),
    }
}

//! HTTP transport for suggestion queries.
//!
//! Exposes the serving boundary:
//!
//! - `POST /v1/api/suggest` with body `{"input": "<string>"}` — answers
//!   with a ranked JSON array of matched entries, or the literal body
//!   `No suggestions` when nothing matches (a compatibility contract:
//!   clients distinguish the two by content, not status).
//! - `GET /healthz` — current snapshot generation and entry count.
//!
//! Malformed or missing `input` yields `400` naming the expected shape.
//! The handlers only ever read the published snapshot; they never block
//! on, or get blocked by, a reload in progress.

use crate::service::SuggestionService;
use crate::{Error, Result};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Client-error message naming the expected request shape.
const EXPECTED_SHAPE: &str = r#"expected request format: {"input": "<string>"}"#;

/// Literal success body when no entry matches.
const NO_SUGGESTIONS: &str = "No suggestions";

/// Decoded suggest request body.
#[derive(Debug, Deserialize)]
struct SuggestRequest {
    input: String,
}

/// Health probe payload.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    generation: u64,
    entries: usize,
}

/// Builds the suggest router over a shared service.
#[must_use]
pub fn router(service: Arc<SuggestionService>) -> Router {
    Router::new()
        .route("/v1/api/suggest", post(handle_suggest))
        .route("/healthz", get(handle_healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Binds the listener and serves until interrupted.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(listen: SocketAddr, service: Arc<SuggestionService>) -> Result<()> {
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "bind".to_string(),
            cause: e.to_string(),
        })?;

    tracing::info!(%listen, "suggestion server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "serve".to_string(),
            cause: e.to_string(),
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}

/// Answers one suggest request against the published snapshot.
///
/// The body is decoded by hand (rather than an extractor) so the
/// client-error response can name the expected shape.
async fn handle_suggest(State(service): State<Arc<SuggestionService>>, body: String) -> Response {
    let Ok(request) = serde_json::from_str::<SuggestRequest>(&body) else {
        return (StatusCode::BAD_REQUEST, EXPECTED_SHAPE).into_response();
    };

    let hits = service.suggest(&request.input);
    if hits.is_empty() {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            NO_SUGGESTIONS,
        )
            .into_response();
    }
    (StatusCode::OK, Json(hits)).into_response()
}

async fn handle_healthz(State(service): State<Arc<SuggestionService>>) -> Json<HealthResponse> {
    let snapshot = service.snapshot();
    Json(HealthResponse {
        status: "ok",
        generation: snapshot.generation(),
        entries: snapshot.index().len(),
    })
}

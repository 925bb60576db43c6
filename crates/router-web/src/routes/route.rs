//! `POST /route` and `GET /healthz`, the router's entire stateless HTTP
//! surface. No session cookies, no auth — both are explicit non-goals.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use router_core::SmartRouter;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub session_id: Uuid,
    pub utterance: String,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub operations: Vec<router_core::Operation>,
    pub rewritten_utterance: Option<String>,
    pub clarify_prompt: Option<String>,
    pub debug: Option<router_core::operation::RoutingDebug>,
}

pub async fn route(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> impl IntoResponse {
    tracing::info!(session_id = %request.session_id, utterance = %request.utterance, "routing utterance");

    let decision = SmartRouter::route(&state.router, request.session_id, &request.utterance).await;

    tracing::debug!(
        operations = ?decision.operations.iter().map(|op| op.tag()).collect::<Vec<_>>(),
        debug = ?decision.debug,
        "routing decision"
    );

    Json(RouteResponse {
        clarify_prompt: decision.clarify_prompt().map(str::to_string),
        operations: decision.operations,
        rewritten_utterance: decision.rewritten_utterance,
        debug: decision.debug,
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub registry_populated: bool,
}

pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.router.registry.snapshot().await;
    let populated = !snapshot.is_empty();
    let status = if populated { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(HealthResponse {
            status: if populated { "ready" } else { "registry empty" },
            registry_populated: populated,
        }),
    )
}

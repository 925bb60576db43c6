//! Router Web Server
//!
//! The router's entire HTTP surface: `POST /route` to drive the smart
//! router from outside a test harness, and `GET /healthz` for a readiness
//! probe. No session cookies, no auth, no chat UI — those are explicit
//! non-goals; this binary exists to exercise `router-core` over HTTP.

mod routes;
mod state;

use axum::{routing::get, routing::post, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "router_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting router-web");

    // The postgres/pgvector backends are available as library APIs
    // (catalog_store::postgres, faq_index::postgres) but wiring them up
    // requires an embedding model for the FAQ index, which sits in the
    // ingestion pipeline — out of scope here (see DESIGN.md). This binary
    // runs the router against in-memory stores, refreshed from nothing and
    // ready to be populated by a future ingestion process via the same
    // `ProductStore`/`FaqIndex` traits.
    let state = AppState::in_memory();

    tokio::spawn({
        let registry = state.router.registry.clone();
        let interval = state.router.config.registry_refresh_interval;
        async move {
            router_core::run_refresh_loop(registry, interval).await;
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app: Router<()> = Router::new()
        .route("/route", post(routes::route::route))
        .route("/healthz", get(routes::route::healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let port: u16 = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("===========================================");
    tracing::info!("  router-web running on http://{}", addr);
    tracing::info!("===========================================");
    tracing::info!("  POST /route    - route an utterance");
    tracing::info!("  GET  /healthz  - readiness probe");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

//! Axum router configuration for all endpoints

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers;
use crate::state::AppState;

/// Create the application router. Static assets are mounted under `/assets`
/// only when the frontend directory exists.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::serve_frontend))
        .route("/health", get(handlers::health))
        .route("/api/draw", get(handlers::draw_cards))
        .route("/api/games", post(handlers::create_game))
        .route("/api/games/{game_id}", get(handlers::get_game))
        .route("/api/games/{game_id}/draw", post(handlers::draw_game_cards));

    if state.frontend_dir.is_dir() {
        router = router.nest_service("/assets", ServeDir::new(&state.frontend_dir));
    }

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(CorsLayer::permissive()),
    )
}

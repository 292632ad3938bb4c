//! Endpoint handlers

use axum::extract::{Path, State};
use axum::response::{Html, Json};
use deckhand_core::draw;
use tracing::debug;

use crate::api::{DrawResponse, GameResponse, HealthResponse, SuitQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/draw - One random card from each suit, or from a single suit
pub async fn draw_cards(
    State(state): State<AppState>,
    query: SuitQuery,
) -> Result<Json<DrawResponse>, ApiError> {
    let deck = state.deck();
    let cards = match query.suit.as_deref() {
        None => draw::draw_all(deck)?,
        Some(requested) => {
            let suit = deck.normalize_suit(requested)?;
            draw::draw_suits(deck, &[suit])?
        }
    };
    debug!("Dealt {} stateless card(s)", cards.len());
    Ok(Json(DrawResponse { cards }))
}

/// POST /api/games - Create a shared game pre-populated with one card per suit
pub async fn create_game(State(state): State<AppState>) -> Result<Json<GameResponse>, ApiError> {
    let view = state.with_store(|store| store.create_game()).await?;
    Ok(Json(view.into()))
}

/// GET /api/games/{game_id} - The cards currently dealt to a shared game
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let view = state
        .with_store(move |store| store.get_game(&game_id))
        .await?;
    Ok(Json(view.into()))
}

/// POST /api/games/{game_id}/draw - Redraw every suit, or a single suit
pub async fn draw_game_cards(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    query: SuitQuery,
) -> Result<Json<GameResponse>, ApiError> {
    let view = state
        .with_store(move |store| store.redraw(&game_id, query.suit.as_deref()))
        .await?;
    Ok(Json(view.into()))
}

/// GET / - The single-page frontend
pub async fn serve_frontend(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let index_file = state.frontend_dir.join("index.html");
    match tokio::fs::read_to_string(&index_file).await {
        Ok(body) => Ok(Html(body)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::NotFound("Frontend build is missing".into()))
        }
        Err(e) => Err(ApiError::Internal(anyhow::anyhow!(
            "failed to read {}: {e}",
            index_file.display()
        ))),
    }
}

/// GET /health - Liveness plus deck size
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let deck = state.deck();
    Json(HealthResponse {
        status: "ok".to_string(),
        suits: deck.suit_count(),
        cards: deck.card_count(),
    })
}

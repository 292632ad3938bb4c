//! Request and response bodies for the HTTP API.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use deckhand_core::deck::Hand;
use deckhand_core::games::GameView;
use serde::Serialize;

use crate::error::ApiError;

/// Optional `?suit=` filter. When present only that suit is drawn.
///
/// A repeated `suit` parameter resolves to its last value. Unparseable query
/// strings are rejected as [`ApiError::BadRequest`].
#[derive(Debug, Default)]
pub struct SuitQuery {
    pub suit: Option<String>,
}

impl SuitQuery {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let suit = pairs
            .into_iter()
            .filter(|(key, _)| key == "suit")
            .map(|(_, value)| value)
            .last();
        Self { suit }
    }
}

impl<S> FromRequestParts<S> for SuitQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self::from_pairs(pairs))
    }
}

/// Response for `GET /api/draw`.
#[derive(Debug, Serialize)]
pub struct DrawResponse {
    pub cards: Hand,
}

/// Response for every `/api/games` endpoint.
#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub game_id: String,
    pub cards: Hand,
}

impl From<GameView> for GameResponse {
    fn from(view: GameView) -> Self {
        Self {
            game_id: view.game_id,
            cards: view.cards,
        }
    }
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub suits: usize,
    pub cards: usize,
}

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

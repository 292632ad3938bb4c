//! Mapping from domain errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use deckhand_core::deck::SuitError;
use deckhand_core::draw::DrawError;
use deckhand_core::games::StoreError;
use tracing::error;

use crate::api::ErrorBody;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Server-side failure whose message is safe to show the client.
    #[error("{0}")]
    Server(String),

    /// Unexpected failure; details are logged, not returned.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Server(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SuitError> for ApiError {
    fn from(err: SuitError) -> Self {
        match err {
            SuitError::Empty => ApiError::BadRequest(err.to_string()),
            SuitError::NotFound(_) => ApiError::NotFound(err.to_string()),
        }
    }
}

impl From<DrawError> for ApiError {
    fn from(err: DrawError) -> Self {
        ApiError::Server(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::GameNotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Suit(e) => e.into(),
            StoreError::Draw(e) => e.into(),
            StoreError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::Internal(e) => {
                error!("Request failed: {e:#}");
                INTERNAL_MESSAGE.to_string()
            }
            ApiError::Server(message) => {
                error!("Request failed: {message}");
                message
            }
            ApiError::BadRequest(message) | ApiError::NotFound(message) => message,
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suit_errors_map_to_client_statuses() {
        assert_eq!(ApiError::from(SuitError::Empty).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(SuitError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn store_errors_map_by_kind() {
        assert_eq!(
            ApiError::from(StoreError::GameNotFound("g".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::Suit(SuitError::Empty)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::Draw(DrawError::CategoryExhausted("Cups".into())))
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(StoreError::Storage(anyhow::anyhow!("disk full"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn game_not_found_message_names_the_game() {
        let err = ApiError::from(StoreError::GameNotFound("abc".into()));
        assert_eq!(err.to_string(), "Game 'abc' not found");
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = ApiError::Internal(anyhow::anyhow!("secret path /var/db")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! Shared handler state.

use std::path::PathBuf;
use std::sync::Arc;

use deckhand_core::deck::Deck;
use deckhand_core::games::{GameStore, StoreError};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<GameStore>,
    /// Directory holding `index.html` and static assets.
    pub frontend_dir: PathBuf,
}

impl AppState {
    pub fn new(store: GameStore, frontend_dir: PathBuf) -> Self {
        Self {
            store: Arc::new(store),
            frontend_dir,
        }
    }

    pub fn deck(&self) -> &Deck {
        self.store.deck()
    }

    /// Run a game-store call on the blocking pool; SQLite access is
    /// synchronous.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&GameStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("game store task failed: {e}")))?;
        result.map_err(ApiError::from)
    }
}

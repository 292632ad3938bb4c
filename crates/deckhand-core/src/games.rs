// Shared games: a persisted hand per game that every viewer sees until
// somebody redraws.
//
// All draws for a call are made up front, so a bad suit name or an exhausted
// suit fails the whole call before anything is written.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use tracing::{debug, info};

use crate::db::{Database, Game};
use crate::deck::{Deck, Hand, SuitError};
use crate::draw::{self, DrawError};

/// Random bytes behind each game id (8 base64url characters).
const GAME_ID_BYTES: usize = 6;

/// Attempts at finding an unused id before giving up.
const GAME_ID_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Game '{0}' not found")]
    GameNotFound(String),

    #[error(transparent)]
    Suit(#[from] SuitError),

    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// A game id and its complete current hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameView {
    pub game_id: String,
    pub cards: Hand,
}

/// Generate a compact URL-safe game id.
pub fn generate_game_id() -> String {
    let bytes: [u8; GAME_ID_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

pub struct GameStore {
    deck: Arc<Deck>,
    db: Database,
}

impl GameStore {
    pub fn new(deck: Arc<Deck>, db: Database) -> Self {
        Self { deck, db }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Create a game and deal one card for every suit.
    pub fn create_game(&self) -> Result<GameView, StoreError> {
        let hand = draw::draw_all(&self.deck)?;

        let mut attempt = 0;
        let game_id = loop {
            let candidate = generate_game_id();
            if self.db.get_game(&candidate)?.is_none() {
                break candidate;
            }
            attempt += 1;
            if attempt >= GAME_ID_ATTEMPTS {
                return Err(StoreError::Storage(anyhow::anyhow!(
                    "could not allocate an unused game id"
                )));
            }
        };

        let now = Utc::now();
        let game = Game {
            id: game_id,
            created_at: now,
            last_activity: now,
        };
        let cards = self.db.create_game_with_hand(&game, &hand)?;
        info!("Created game {} with {} cards", game.id, cards.len());

        Ok(GameView {
            game_id: game.id,
            cards,
        })
    }

    /// Fetch a game's hand. A game that exists but has no cards yet gets a
    /// full hand dealt on the spot.
    pub fn get_game(&self, game_id: &str) -> Result<GameView, StoreError> {
        let game = self
            .db
            .get_game(game_id)?
            .ok_or_else(|| StoreError::GameNotFound(game_id.to_string()))?;

        let cards = self.db.load_hand(&game.id)?;
        if !cards.is_empty() {
            return Ok(GameView {
                game_id: game.id,
                cards,
            });
        }

        debug!("Game {} has no cards, dealing a full hand", game.id);
        self.redraw_suits(&game.id, None)
    }

    /// Redraw one suit (user input, normalized) or every suit when `suit` is
    /// `None`.
    pub fn redraw(&self, game_id: &str, suit: Option<&str>) -> Result<GameView, StoreError> {
        match suit {
            Some(suit) => {
                let requested = [suit.to_string()];
                self.redraw_suits(game_id, Some(&requested[..]))
            }
            None => self.redraw_suits(game_id, None),
        }
    }

    /// Redraw the listed suits (user input, normalized) or every suit when
    /// `suits` is `None`, then return the game's complete hand including
    /// untouched suits. Refreshes the game's `last_activity` either way.
    pub fn redraw_suits(
        &self,
        game_id: &str,
        suits: Option<&[String]>,
    ) -> Result<GameView, StoreError> {
        if self.db.get_game(game_id)?.is_none() {
            return Err(StoreError::GameNotFound(game_id.to_string()));
        }

        let hand = match suits {
            None => draw::draw_all(&self.deck)?,
            Some(requested) => {
                let canonical = requested
                    .iter()
                    .map(|s| self.deck.normalize_suit(s))
                    .collect::<Result<Vec<_>, _>>()?;
                draw::draw_suits(&self.deck, &canonical)?
            }
        };

        let cards = self
            .db
            .deal_cards(game_id, &hand, Utc::now())?
            .ok_or_else(|| StoreError::GameNotFound(game_id.to_string()))?;
        debug!("Redrew {} suit(s) for game {}", hand.len(), game_id);

        Ok(GameView {
            game_id: game_id.to_string(),
            cards,
        })
    }
}

// SQLite persistence layer for shared games.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::deck::{Card, Hand};

/// A persisted game row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// SQLite-backed persistence for games and the card currently dealt to each
/// of their suits.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS game (
                id            TEXT PRIMARY KEY,
                created_at    TEXT NOT NULL,
                last_activity TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS game_card (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id    TEXT NOT NULL REFERENCES game(id),
                suit       TEXT NOT NULL,
                card_id    TEXT NOT NULL,
                name       TEXT NOT NULL,
                short_text TEXT NOT NULL,
                text       TEXT NOT NULL,
                url        TEXT,
                updated_at TEXT NOT NULL,
                UNIQUE(game_id, suit)
            );

            CREATE INDEX IF NOT EXISTS idx_game_card_game_id ON game_card(game_id);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock).
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Insert a bare game row with no cards.
    pub fn insert_game(&self, game: &Game) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO game (id, created_at, last_activity) VALUES (?1, ?2, ?3)",
            params![game.id, game.created_at, game.last_activity],
        )
        .context("failed to insert game")?;
        Ok(())
    }

    /// Look up a game by id.
    pub fn get_game(&self, game_id: &str) -> Result<Option<Game>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, created_at, last_activity FROM game WHERE id = ?1",
            params![game_id],
            |row| {
                Ok(Game {
                    id: row.get(0)?,
                    created_at: row.get(1)?,
                    last_activity: row.get(2)?,
                })
            },
        )
        .optional()
        .context("failed to load game")
    }

    /// Load every dealt card for a game, in the order the suits were first
    /// dealt. Empty when the game has no cards (or does not exist).
    pub fn load_hand(&self, game_id: &str) -> Result<Hand> {
        let conn = self.conn();
        read_hand(&conn, game_id)
    }

    /// Create a game and deal its opening hand in one transaction.
    pub fn create_game_with_hand(&self, game: &Game, hand: &Hand) -> Result<Hand> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;

        tx.execute(
            "INSERT INTO game (id, created_at, last_activity) VALUES (?1, ?2, ?3)",
            params![game.id, game.created_at, game.last_activity],
        )
        .context("failed to insert game")?;
        upsert_cards(&tx, &game.id, hand, game.last_activity)?;

        let stored = read_hand(&tx, &game.id)?;
        tx.commit().context("failed to commit create_game")?;
        Ok(stored)
    }

    /// Replace (or insert) the dealt card for every suit in `hand`, touch the
    /// game's `last_activity`, and return the game's complete hand. All in one
    /// transaction. Returns `None` without writing anything when the game does
    /// not exist.
    pub fn deal_cards(
        &self,
        game_id: &str,
        hand: &Hand,
        now: DateTime<Utc>,
    ) -> Result<Option<Hand>> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;

        let touched = tx
            .execute(
                "UPDATE game SET last_activity = ?2 WHERE id = ?1",
                params![game_id, now],
            )
            .context("failed to update game activity")?;
        if touched == 0 {
            return Ok(None);
        }

        upsert_cards(&tx, game_id, hand, now)?;

        let stored = read_hand(&tx, game_id)?;
        tx.commit().context("failed to commit deal_cards")?;
        Ok(Some(stored))
    }

    /// Number of card rows stored for a game.
    pub fn card_count(&self, game_id: &str) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM game_card WHERE game_id = ?1",
                params![game_id],
                |row| row.get(0),
            )
            .context("failed to count game cards")?;
        Ok(count as usize)
    }
}

/// Single-statement upsert keyed on the `(game_id, suit)` unique constraint,
/// so concurrent redraws of one suit can never produce two rows.
fn upsert_cards(
    tx: &Transaction<'_>,
    game_id: &str,
    hand: &Hand,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut stmt = tx
        .prepare_cached(
            "INSERT INTO game_card
                (game_id, suit, card_id, name, short_text, text, url, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(game_id, suit) DO UPDATE SET
                card_id    = excluded.card_id,
                name       = excluded.name,
                short_text = excluded.short_text,
                text       = excluded.text,
                url        = excluded.url,
                updated_at = excluded.updated_at",
        )
        .context("failed to prepare card upsert")?;

    for (suit, card) in hand {
        stmt.execute(params![
            game_id,
            suit,
            card.id,
            card.name,
            card.short_text,
            card.full_text,
            card.url,
            now,
        ])
        .with_context(|| format!("failed to upsert card for suit {suit}"))?;
    }
    Ok(())
}

fn read_hand(conn: &Connection, game_id: &str) -> Result<Hand> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT suit, card_id, name, short_text, text, url
             FROM game_card WHERE game_id = ?1 ORDER BY id",
        )
        .context("failed to prepare load_hand query")?;

    let rows = stmt
        .query_map(params![game_id], |row| {
            let suit: String = row.get(0)?;
            Ok((
                suit.clone(),
                Card {
                    id: row.get(1)?,
                    category: suit,
                    name: row.get(2)?,
                    short_text: row.get(3)?,
                    full_text: row.get(4)?,
                    url: row.get(5)?,
                },
            ))
        })
        .context("failed to query game cards")?
        .collect::<std::result::Result<Hand, _>>()
        .context("failed to map game card rows")?;

    Ok(rows)
}

// Card dataset loading and suit lookup.
//
// Reads a tab-separated file with Category2 / Name / Text / ShortText / URL
// columns and buckets the qualifying rows by suit. The resulting `Deck` is
// built once at startup and only ever read afterwards.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Character budget for a generated short text, before the ellipsis.
pub const SHORT_TEXT_LIMIT: usize = 190;

const ELLIPSIS: &str = "...";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A single dealable card.
///
/// Serialized with the field names clients already consume (`suit`, `text`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Zero-based index of the source row among all data rows.
    pub id: String,
    #[serde(rename = "suit")]
    pub category: String,
    pub name: String,
    pub short_text: String,
    #[serde(rename = "text")]
    pub full_text: String,
    pub url: Option<String>,
}

/// Ordered suit → card mapping handed back to clients.
pub type Hand = IndexMap<String, Card>;

/// Every loaded card, bucketed by canonical suit name in order of first
/// appearance. Every bucket holds at least one card.
#[derive(Debug, Clone)]
pub struct Deck {
    suits: IndexMap<String, Vec<Card>>,
    /// Lowercased suit name → canonical suit name.
    lookup: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot locate data file at {path}: {source}")]
    DataUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("no cards were loaded from {path}")]
    EmptyDataset { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuitError {
    #[error("Suit name cannot be empty")]
    Empty,

    #[error("Suit '{0}' was not found")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// Raw TSV row (private)
// ---------------------------------------------------------------------------

/// One data row. Columns are matched by header name. Cells that are empty,
/// missing from a short row, or whose column is absent all read as `None`;
/// unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct RawCardRow {
    #[serde(rename = "Category2", default)]
    category: Option<String>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Text", default)]
    text: Option<String>,
    #[serde(rename = "ShortText", default)]
    short_text: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
}

fn trimmed(cell: &Option<String>) -> &str {
    cell.as_deref().map(str::trim).unwrap_or("")
}

impl RawCardRow {
    fn into_card(self, index: usize) -> Option<Card> {
        let category = trimmed(&self.category);
        let name = trimmed(&self.name);
        let text = trimmed(&self.text);
        if category.is_empty() || name.is_empty() || text.is_empty() {
            return None;
        }

        let url = trimmed(&self.url);
        Some(Card {
            id: index.to_string(),
            category: category.to_string(),
            name: name.to_string(),
            short_text: build_short_text(text, trimmed(&self.short_text)),
            full_text: text.to_string(),
            url: (!url.is_empty()).then(|| url.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Short text
// ---------------------------------------------------------------------------

/// Prefer the provided short text; otherwise cut `text` down to
/// [`SHORT_TEXT_LIMIT`] characters at the last space and append `...`.
pub fn build_short_text(text: &str, short_text: &str) -> String {
    let provided = short_text.trim();
    if !provided.is_empty() {
        return provided.to_string();
    }

    let snippet = text.trim();
    let cut = match snippet.char_indices().nth(SHORT_TEXT_LIMIT) {
        Some((byte_idx, _)) => byte_idx,
        None => return snippet.to_string(),
    };

    let prefix = &snippet[..cut];
    let truncated = match prefix.rsplit_once(' ') {
        Some((head, _)) => head,
        None => prefix,
    };
    format!("{}{ELLIPSIS}", truncated.trim_end())
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_cards_from_reader<R: Read>(rdr: R) -> Result<Vec<Card>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(rdr);

    let headers = reader.headers()?.clone();

    let mut cards = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = result.and_then(|mut record| {
            // Short rows are padded so every header has a cell to read.
            while record.len() < headers.len() {
                record.push_field("");
            }
            record.truncate(headers.len());
            record.deserialize::<RawCardRow>(Some(&headers))
        });
        match row {
            Ok(raw) => {
                if let Some(card) = raw.into_card(index) {
                    cards.push(card);
                }
            }
            Err(e) => {
                warn!("skipping malformed card row {index}: {e}");
            }
        }
    }
    Ok(cards)
}

/// Parse a TSV stream into a [`Deck`]. Returns `Ok(None)` when no row
/// qualified.
pub fn load_deck_from_reader<R: Read>(rdr: R) -> Result<Option<Deck>, csv::Error> {
    let cards = load_cards_from_reader(rdr)?;
    Ok(Deck::from_cards(cards))
}

/// Load the deck from the TSV file at `path`.
pub fn load_deck(path: &Path) -> Result<Deck, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::DataUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;

    let deck = load_deck_from_reader(file)
        .map_err(|e| LoadError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .ok_or_else(|| LoadError::EmptyDataset {
            path: path.to_path_buf(),
        })?;

    info!(
        "Loaded {} cards across {} suits from {}",
        deck.card_count(),
        deck.suit_count(),
        path.display()
    );
    Ok(deck)
}

// ---------------------------------------------------------------------------
// Deck
// ---------------------------------------------------------------------------

impl Deck {
    /// Bucket cards by suit, keeping first-appearance order. Returns `None` for
    /// an empty input so an empty deck can never be constructed.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Option<Self> {
        let mut suits: IndexMap<String, Vec<Card>> = IndexMap::new();
        for card in cards {
            suits.entry(card.category.clone()).or_default().push(card);
        }
        if suits.is_empty() {
            return None;
        }

        let lookup = suits
            .keys()
            .map(|suit| (suit.to_lowercase(), suit.clone()))
            .collect();
        Some(Self { suits, lookup })
    }

    /// Canonical suit names in deck order.
    pub fn suit_names(&self) -> impl Iterator<Item = &str> {
        self.suits.keys().map(String::as_str)
    }

    pub fn suit_count(&self) -> usize {
        self.suits.len()
    }

    pub fn card_count(&self) -> usize {
        self.suits.values().map(Vec::len).sum()
    }

    /// Cards belonging to a canonical suit name.
    pub fn cards(&self, suit: &str) -> Option<&[Card]> {
        self.suits.get(suit).map(Vec::as_slice)
    }

    /// Resolve user input to a canonical suit name, ignoring case and
    /// surrounding whitespace.
    pub fn normalize_suit(&self, input: &str) -> Result<&str, SuitError> {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(SuitError::Empty);
        }
        self.lookup
            .get(&normalized)
            .map(String::as_str)
            .ok_or_else(|| SuitError::NotFound(input.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Integration tests: dataset file -> deck -> draws -> persisted games.

use std::path::PathBuf;
use std::sync::Arc;

use deckhand_core::db::Database;
use deckhand_core::deck::{load_deck, LoadError};
use deckhand_core::draw;
use deckhand_core::games::{GameStore, StoreError};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn fixture_dataset_loads_qualifying_rows_only() {
    let deck = load_deck(&fixture("cards.tsv")).unwrap();

    let suits: Vec<&str> = deck.suit_names().collect();
    assert_eq!(suits, vec!["Cups", "Wands", "Pentacles"]);
    assert_eq!(deck.card_count(), 4);

    let cups = deck.cards("Cups").unwrap();
    assert_eq!(cups[0].id, "0");
    assert_eq!(cups[0].short_text, "Overflowing vessel");
    assert_eq!(cups[0].url.as_deref(), Some("https://example.com/cups/1"));
    assert_eq!(cups[1].id, "2");
    assert_eq!(cups[1].short_text, "Two figures exchange cups.");
    assert_eq!(cups[1].url, None);

    // Skipped rows still consume an index.
    let pentacles = deck.cards("Pentacles").unwrap();
    assert_eq!(pentacles[0].id, "5");
}

#[test]
fn missing_dataset_is_data_unavailable() {
    let err = load_deck(&fixture("does-not-exist.tsv")).unwrap_err();
    assert!(matches!(err, LoadError::DataUnavailable { .. }));
}

#[test]
fn header_only_dataset_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.tsv");
    std::fs::write(&path, "Category2\tName\tText\tShortText\tURL\n").unwrap();

    let err = load_deck(&path).unwrap_err();
    assert!(matches!(err, LoadError::EmptyDataset { .. }));
}

#[test]
fn stateless_draw_covers_every_suit() {
    let deck = load_deck(&fixture("cards.tsv")).unwrap();
    let hand = draw::draw_all(&deck).unwrap();

    let keys: Vec<&str> = hand.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Cups", "Wands", "Pentacles"]);
    for (suit, card) in &hand {
        assert_eq!(&card.category, suit);
    }
}

#[test]
fn games_persist_across_store_instances_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("games.db");
    let db_path = db_path.to_str().unwrap();
    let deck = Arc::new(load_deck(&fixture("cards.tsv")).unwrap());

    let created = {
        let store = GameStore::new(Arc::clone(&deck), Database::open(db_path).unwrap());
        store.create_game().unwrap()
    };

    let store = GameStore::new(deck, Database::open(db_path).unwrap());
    let fetched = store.get_game(&created.game_id).unwrap();
    assert_eq!(fetched, created);

    let redrawn = store.redraw(&created.game_id, Some("WANDS")).unwrap();
    assert_eq!(redrawn.cards["Cups"], created.cards["Cups"]);
    assert_eq!(redrawn.cards["Pentacles"], created.cards["Pentacles"]);

    let err = store.redraw("nope", Some("Cups")).unwrap_err();
    assert!(matches!(err, StoreError::GameNotFound(id) if id == "nope"));
}

// Uniform random card selection.
//
// Every draw is independent: repeated draws of one suit may return the same
// card. The default entry points use the thread-local RNG so concurrent
// requests never contend on shared generator state.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::deck::{Card, Deck, Hand};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("Not enough cards available in the '{0}' suit")]
    CategoryExhausted(String),
}

/// Draw one card from `suit` (a canonical name) with the given RNG.
pub fn draw_one_with<R: Rng + ?Sized>(
    deck: &Deck,
    suit: &str,
    rng: &mut R,
) -> Result<Card, DrawError> {
    deck.cards(suit)
        .and_then(|cards| cards.choose(rng))
        .cloned()
        .ok_or_else(|| DrawError::CategoryExhausted(suit.to_string()))
}

/// Draw one card from `suit` using the thread-local RNG.
pub fn draw_one(deck: &Deck, suit: &str) -> Result<Card, DrawError> {
    draw_one_with(deck, suit, &mut rand::rng())
}

/// Draw one card for each listed suit, in the listed order.
pub fn draw_suits_with<R, S>(deck: &Deck, suits: &[S], rng: &mut R) -> Result<Hand, DrawError>
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    let mut hand = Hand::with_capacity(suits.len());
    for suit in suits {
        let suit = suit.as_ref();
        let card = draw_one_with(deck, suit, rng)?;
        hand.insert(suit.to_string(), card);
    }
    Ok(hand)
}

pub fn draw_suits<S: AsRef<str>>(deck: &Deck, suits: &[S]) -> Result<Hand, DrawError> {
    draw_suits_with(deck, suits, &mut rand::rng())
}

/// Draw one card for every suit in the deck.
pub fn draw_all_with<R: Rng + ?Sized>(deck: &Deck, rng: &mut R) -> Result<Hand, DrawError> {
    let suits: Vec<&str> = deck.suit_names().collect();
    draw_suits_with(deck, &suits, rng)
}

pub fn draw_all(deck: &Deck) -> Result<Hand, DrawError> {
    draw_all_with(deck, &mut rand::rng())
}

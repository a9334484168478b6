use super::Card;
use rand::seq::SliceRandom;

/// Ordered collection of cards not currently on the board.
/// Owned exclusively by the coordinator; mutated only between rounds and
/// when refilling vacated slots. Draws come off the top; collected cards
/// return to the bottom.
#[derive(Debug, Clone)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// Full universe of `size` cards, in id order.
    pub fn new(size: usize) -> Self {
        Self((0..size).map(|id| Card::from(id as u8)).collect())
    }

    pub fn shuffle(&mut self) {
        self.0.shuffle(&mut rand::rng());
    }

    /// Next card off the top, if any remain.
    pub fn draw(&mut self) -> Option<Card> {
        self.0.pop()
    }

    /// Return a card collected from the board.
    pub fn restore(&mut self, card: Card) {
        self.0.insert(0, card);
    }

    /// Remove a specific card, wherever it sits.
    pub fn remove(&mut self, card: Card) {
        self.0.retain(|c| *c != card);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cards remaining, for end-of-game existence checks.
    pub fn cards(&self) -> &[Card] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn deck_starts_full() {
        let deck = Deck::new(81);
        assert_eq!(deck.len(), 81);
        assert!(!deck.is_empty());
    }
    #[test]
    fn draw_and_restore_conserve_cards() {
        let mut deck = Deck::new(12);
        let card = deck.draw().unwrap();
        assert_eq!(deck.len(), 11);
        deck.restore(card);
        assert_eq!(deck.len(), 12);
    }
    #[test]
    fn shuffle_keeps_population() {
        let mut deck = Deck::new(30);
        deck.shuffle();
        let mut drawn: Vec<u8> = std::iter::from_fn(|| deck.draw()).map(u8::from).collect();
        drawn.sort_unstable();
        assert_eq!(drawn, (0..30).collect::<Vec<u8>>());
    }
    #[test]
    fn empty_deck_yields_nothing() {
        let mut deck = Deck::new(0);
        assert!(deck.draw().is_none());
    }
}

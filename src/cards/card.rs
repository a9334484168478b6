/// Card identifier in `[0, deck_size)`.
/// Identity only; legality rules and feature decomposition live in the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card(u8);

impl From<u8> for Card {
    fn from(id: u8) -> Self {
        Self(id)
    }
}
impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.0
    }
}
impl From<Card> for usize {
    fn from(card: Card) -> Self {
        card.0 as usize
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{:02}", self.0)
    }
}

use crate::cards::Card;

/// Decides which card combinations are legal claims.
/// Pure and stateless from the engine's perspective: the board consults it
/// for hint output, the coordinator for claim verification and end-of-game
/// detection.
pub trait Oracle: Send + Sync {
    /// Enumerate up to `limit` legal combinations among `cards`.
    /// A limit of 1 is an existence check.
    fn find_legal(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>>;
    /// Test a specific combination for legality.
    fn is_legal(&self, cards: &[Card]) -> bool;
    /// Per-card feature vectors. Diagnostic hint output only, never core logic.
    fn features(&self, cards: &[Card]) -> Vec<Vec<u8>>;
}

/// Classic matching rule: card ids decompose into base-`values` feature
/// digits, and a combination is legal when every feature is all-same or
/// all-distinct across its cards.
#[derive(Debug, Clone, Copy)]
pub struct FeatureOracle {
    set_size: usize,
    features: usize,
    values: u8,
}

impl FeatureOracle {
    pub fn new(set_size: usize, features: usize, values: u8) -> Self {
        Self {
            set_size,
            features,
            values,
        }
    }

    /// Feature digits of a card, most significant first.
    fn digits(&self, card: Card) -> Vec<u8> {
        let mut id = u8::from(card);
        let mut digits = vec![0u8; self.features];
        for digit in digits.iter_mut().rev() {
            *digit = id % self.values;
            id /= self.values;
        }
        digits
    }

    fn legal(&self, combo: &[Card]) -> bool {
        combo.len() == self.set_size
            && (0..self.features).all(|feature| {
                let mut values: Vec<u8> = combo
                    .iter()
                    .map(|card| self.digits(*card)[feature])
                    .collect();
                let same = values.iter().all(|v| *v == values[0]);
                values.sort_unstable();
                values.dedup();
                same || values.len() == combo.len()
            })
    }

    fn search(
        &self,
        cards: &[Card],
        from: usize,
        combo: &mut Vec<Card>,
        limit: usize,
        found: &mut Vec<Vec<Card>>,
    ) {
        if found.len() >= limit {
            return;
        }
        if combo.len() == self.set_size {
            if self.legal(combo) {
                found.push(combo.clone());
            }
            return;
        }
        for i in from..cards.len() {
            combo.push(cards[i]);
            self.search(cards, i + 1, combo, limit, found);
            combo.pop();
            if found.len() >= limit {
                return;
            }
        }
    }
}

impl Default for FeatureOracle {
    /// The 81-card game: 4 features, 3 values, combinations of 3.
    fn default() -> Self {
        Self::new(3, 4, 3)
    }
}

impl Oracle for FeatureOracle {
    fn find_legal(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>> {
        let mut found = Vec::new();
        let mut combo = Vec::with_capacity(self.set_size);
        self.search(cards, 0, &mut combo, limit, &mut found);
        found
    }
    fn is_legal(&self, cards: &[Card]) -> bool {
        self.legal(cards)
    }
    fn features(&self, cards: &[Card]) -> Vec<Vec<u8>> {
        cards.iter().map(|card| self.digits(*card)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn cards(ids: &[u8]) -> Vec<Card> {
        ids.iter().copied().map(Card::from).collect()
    }
    #[test]
    fn all_distinct_last_feature_is_legal() {
        let oracle = FeatureOracle::default();
        assert!(oracle.is_legal(&cards(&[0, 1, 2])));
    }
    #[test]
    fn mixed_feature_is_illegal() {
        let oracle = FeatureOracle::default();
        assert!(!oracle.is_legal(&cards(&[0, 1, 3])));
    }
    #[test]
    fn wrong_size_is_illegal() {
        let oracle = FeatureOracle::default();
        assert!(!oracle.is_legal(&cards(&[0, 1])));
        assert!(!oracle.is_legal(&cards(&[0, 1, 2, 4])));
    }
    #[test]
    fn limit_bounds_enumeration() {
        let oracle = FeatureOracle::default();
        let universe: Vec<Card> = (0..81).map(Card::from).collect();
        assert_eq!(oracle.find_legal(&universe, 1).len(), 1);
        assert_eq!(oracle.find_legal(&universe, 7).len(), 7);
    }
    #[test]
    fn too_few_cards_yield_nothing() {
        let oracle = FeatureOracle::default();
        assert!(oracle.find_legal(&cards(&[0, 1]), 1).is_empty());
    }
    #[test]
    fn feature_digits() {
        let oracle = FeatureOracle::default();
        assert_eq!(oracle.features(&cards(&[5]))[0], vec![0, 0, 1, 2]);
        assert_eq!(oracle.features(&cards(&[80]))[0], vec![2, 2, 2, 2]);
    }
    #[test]
    fn enumerated_combinations_are_legal() {
        let oracle = FeatureOracle::default();
        let universe: Vec<Card> = (0..27).map(Card::from).collect();
        for combo in oracle.find_legal(&universe, usize::MAX) {
            assert!(oracle.is_legal(&combo));
        }
    }
}

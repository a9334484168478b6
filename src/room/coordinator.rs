use super::Stopper;
use super::board::Board;
use super::claim::Claim;
use super::claim::Verdict;
use super::window::RoundWindow;
use crate::cards::Card;
use crate::cards::Deck;
use crate::oracle::Oracle;
use crate::ui::Ui;
use crate::{Config, Position, Score, Slot};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::time::timeout;

/// Owns the round lifecycle: dealing, claim arbitration, timeout
/// reshuffles, scoring, and end-of-game detection. One per game; the only
/// actor that mutates the slot↔card relation or the deck.
pub struct Coordinator {
    config: Config,
    board: Arc<Board>,
    oracle: Arc<dyn Oracle>,
    ui: Arc<dyn Ui>,
    deck: Deck,
    scores: Vec<Score>,
    claims: mpsc::UnboundedReceiver<Claim>,
    window: RoundWindow,
    stop: watch::Receiver<bool>,
    stopper: Stopper,
}

impl Coordinator {
    pub fn new(
        config: Config,
        board: Arc<Board>,
        oracle: Arc<dyn Oracle>,
        ui: Arc<dyn Ui>,
        claims: mpsc::UnboundedReceiver<Claim>,
        stop: watch::Receiver<bool>,
        stopper: Stopper,
    ) -> Self {
        let deck = Deck::new(config.deck_size);
        let scores = vec![0; config.players];
        let window = RoundWindow::new(config.turn_timeout, config.warning_time);
        Self {
            config,
            board,
            oracle,
            ui,
            deck,
            scores,
            claims,
            window,
            stop,
            stopper,
        }
    }

    /// Round lifecycle: deal, run the round to a claim-or-timeout loop,
    /// collect, repeat until termination is requested or no legal
    /// combination remains in play. Ends by announcing the winner set and
    /// requesting every agent to terminate.
    pub async fn run(mut self) -> Vec<Position> {
        log::debug!("[coordinator] starting");
        while !self.finished().await {
            self.deck.shuffle();
            self.deal().await;
            self.window.reset();
            self.round().await;
            self.tick();
            self.collect().await;
        }
        let winners = self.announce();
        self.stopper.stop();
        log::debug!("[coordinator] terminated");
        winners
    }

    fn stopped(&self) -> bool {
        *self.stop.borrow()
    }

    /// End-of-game: termination requested, or zero legal combinations exist
    /// among all cards still in play (deck plus board).
    async fn finished(&self) -> bool {
        if self.stopped() {
            return true;
        }
        let mut in_play: Vec<Card> = self.deck.cards().to_vec();
        in_play.extend(self.board.cards_in_play().await);
        self.oracle.find_legal(&in_play, 1).is_empty()
    }

    /// Fill every vacant slot from the deck, in shuffled slot order.
    async fn deal(&mut self) {
        let mut vacant = self.board.vacancies().await;
        if vacant.is_empty() || self.deck.is_empty() {
            return;
        }
        vacant.shuffle(&mut rand::rng());
        let mut session = self.board.exclusive().await;
        for slot in vacant {
            match self.deck.draw() {
                Some(card) => session.place(card, slot).await,
                None => break,
            }
        }
        drop(session);
        if self.config.hints {
            self.board.hints(self.oracle.as_ref()).await;
        }
    }

    /// One round: wait on the claim mailbox with a bounded timeout so the
    /// countdown refreshes even with no claims. Claims are verified
    /// strictly one at a time, in the order the mailbox yields them; every
    /// iteration refreshes the countdown and refills vacated slots.
    async fn round(&mut self) {
        while !self.stopped() && !self.window.expired() {
            match timeout(self.config.poll_interval, self.claims.recv()).await {
                Ok(Some(claim)) => self.resolve(claim).await,
                // every seat has hung up
                Ok(None) => break,
                // poll tick
                Err(_) => {}
            }
            self.tick();
            self.deal().await;
        }
    }

    /// Verify a claim against the live board and the oracle, mutate, then
    /// release the claimant. Every path resolves the claim exactly once,
    /// after all state mutation for it is finished. A claim whose cards
    /// were overtaken by a board mutation is a penalty, never silently
    /// dropped and never scored.
    async fn resolve(&mut self, claim: Claim) {
        let player = claim.player();
        let verdict = match self.board.current_claim(player).await {
            // the mark count changed since submission, or a racing bulk
            // mutation removed one of the cards
            None => Verdict::Penalty,
            Some(cards) if !self.oracle.is_legal(&cards) => Verdict::Penalty,
            Some(cards) => {
                self.window.reset();
                self.tick();
                let mut session = self.board.exclusive().await;
                for card in &cards {
                    if let Some(slot) = session.slot_of(*card) {
                        // claimed cards leave play for good
                        session.remove(slot).await;
                    }
                }
                drop(session);
                self.scores[player] += 1;
                self.ui.set_score(player, self.scores[player]);
                Verdict::Point
            }
        };
        log::debug!("[coordinator] claim from P{}: {:?}", player, verdict);
        claim.resolve(verdict);
    }

    fn tick(&self) {
        self.ui.set_countdown(self.window.remaining(), self.window.low());
    }

    /// Return every card on the board to the deck, in shuffled slot order.
    async fn collect(&mut self) {
        let mut session = self.board.exclusive().await;
        let mut slots: Vec<Slot> = (0..self.board.slots()).collect();
        slots.shuffle(&mut rand::rng());
        for slot in slots {
            if let Some(card) = session.card_at(slot) {
                session.remove(slot).await;
                self.deck.restore(card);
            }
        }
        drop(session);
        self.ui.clear_tokens();
    }

    /// The maximum score takes it; ties preserved, every seat at the
    /// maximum is a winner.
    fn announce(&self) -> Vec<Position> {
        let winners = winners(&self.scores);
        self.ui.announce_winners(&winners);
        log::info!(
            "[coordinator] winners {:?} with scores {:?}",
            winners,
            self.scores
        );
        winners
    }
}

/// Every position whose score equals the maximum.
fn winners(scores: &[Score]) -> Vec<Position> {
    let best = scores.iter().copied().max().unwrap_or(0);
    scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score == best)
        .map(|(position, _)| position)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::FeatureOracle;
    use crate::ui::NullUi;
    use std::time::Duration;

    #[test]
    fn ties_are_preserved() {
        assert_eq!(winners(&[4, 4, 2]), vec![0, 1]);
        assert_eq!(winners(&[5, 2, 2]), vec![0]);
        assert_eq!(winners(&[0, 0]), vec![0, 1]);
    }

    struct Rig {
        coordinator: Coordinator,
        board: Arc<Board>,
    }

    fn rig() -> Rig {
        let config = Config {
            players: 2,
            settle_delay: Duration::ZERO,
            ..Config::default()
        };
        let ui: Arc<dyn Ui> = Arc::new(NullUi);
        let board = Arc::new(Board::new(&config, ui.clone()));
        let oracle: Arc<dyn Oracle> = Arc::new(FeatureOracle::default());
        let (_claims_tx, claims_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let coordinator = Coordinator::new(
            config,
            board.clone(),
            oracle,
            ui,
            claims_rx,
            stop_rx,
            Stopper::new(stop_tx),
        );
        Rig { coordinator, board }
    }

    async fn deal(rig: &mut Rig, cards: &[(u8, Slot)]) {
        let mut session = rig.board.exclusive().await;
        for (card, slot) in cards {
            session.place(Card::from(*card), *slot).await;
            rig.coordinator.deck.remove(Card::from(*card));
        }
    }

    async fn mark(board: &Board, player: Position, slots: &[Slot]) {
        for slot in slots {
            board.toggle(player, *slot).await;
        }
    }

    #[tokio::test]
    async fn legal_claim_scores_and_frees_slots() {
        let mut rig = rig();
        // cards 0,1,2 share three features and run through the fourth
        deal(&mut rig, &[(0, 0), (1, 5), (2, 9), (40, 1)]).await;
        mark(&rig.board, 0, &[0, 5, 9]).await;
        let (claim, barrier) = Claim::new(0);
        rig.coordinator.resolve(claim).await;
        assert_eq!(barrier.await.unwrap(), Verdict::Point);
        assert_eq!(rig.coordinator.scores[0], 1);
        assert_eq!(rig.board.count_cards().await, 1);
        for slot in [0, 5, 9] {
            assert!(rig.board.vacancies().await.contains(&slot));
        }
        // the vacated slots refill from the deck
        let deck_before = rig.coordinator.deck.len();
        rig.coordinator.deal().await;
        assert_eq!(rig.board.count_cards().await, rig.board.slots());
        assert!(rig.coordinator.deck.len() < deck_before);
    }

    #[tokio::test]
    async fn illegal_claim_is_penalized_in_place() {
        let mut rig = rig();
        // feature mix of 0,1,3 fails the all-same-or-all-distinct rule
        deal(&mut rig, &[(0, 0), (1, 5), (3, 9)]).await;
        mark(&rig.board, 0, &[0, 5, 9]).await;
        let (claim, barrier) = Claim::new(0);
        rig.coordinator.resolve(claim).await;
        assert_eq!(barrier.await.unwrap(), Verdict::Penalty);
        assert_eq!(rig.coordinator.scores[0], 0);
        // all three cards stay on the board, marks included
        assert_eq!(rig.board.count_cards().await, 3);
        assert_eq!(rig.board.current_claim(0).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn race_overtaken_claim_is_penalized_exactly_once() {
        let mut rig = rig();
        deal(&mut rig, &[(0, 0), (1, 5), (2, 9)]).await;
        mark(&rig.board, 0, &[0, 5, 9]).await;
        let (claim, barrier) = Claim::new(0);
        // a bulk mutation beats the claim to the table
        let mut session = rig.board.exclusive().await;
        session.remove(5).await;
        drop(session);
        rig.coordinator.resolve(claim).await;
        assert_eq!(barrier.await.unwrap(), Verdict::Penalty);
        assert_eq!(rig.coordinator.scores[0], 0);
    }

    #[tokio::test]
    async fn partial_claim_is_never_verified() {
        let mut rig = rig();
        deal(&mut rig, &[(0, 0), (1, 5)]).await;
        mark(&rig.board, 0, &[0, 5]).await;
        let (claim, barrier) = Claim::new(0);
        rig.coordinator.resolve(claim).await;
        assert_eq!(barrier.await.unwrap(), Verdict::Penalty);
    }

    #[tokio::test]
    async fn exhausted_combinations_finish_the_game() {
        let config = Config {
            players: 2,
            deck_size: 2,
            settle_delay: Duration::ZERO,
            ..Config::default()
        };
        let ui: Arc<dyn Ui> = Arc::new(NullUi);
        let board = Arc::new(Board::new(&config, ui.clone()));
        let oracle: Arc<dyn Oracle> = Arc::new(FeatureOracle::default());
        let (_claims_tx, claims_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let coordinator = Coordinator::new(
            config,
            board,
            oracle,
            ui,
            claims_rx,
            stop_rx,
            Stopper::new(stop_tx),
        );
        assert!(coordinator.finished().await);
    }

    #[tokio::test]
    async fn collect_returns_the_board_to_the_deck() {
        let mut rig = rig();
        rig.coordinator.deck.shuffle();
        rig.coordinator.deal().await;
        assert_eq!(rig.board.count_cards().await, rig.board.slots());
        rig.coordinator.collect().await;
        assert_eq!(rig.board.count_cards().await, 0);
        assert_eq!(rig.coordinator.deck.len(), rig.coordinator.config.deck_size);
    }
}

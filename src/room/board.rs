use crate::cards::Card;
use crate::oracle::Oracle;
use crate::ui::Ui;
use crate::{Config, Position, Slot};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::sync::MutexGuard;
use tokio::sync::Notify;
use tokio::sync::RwLock;
use tokio::sync::RwLockWriteGuard;

/// Outcome of a token toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Token placed; the player's mark count afterwards.
    Placed(usize),
    /// Token removed; the player's mark count afterwards.
    Removed(usize),
    /// No-op: the slot is vacant, or the player's claim is already full.
    Rejected,
}

/// Bidirectional slot↔card relation.
/// `slot_of(card_at(s)) == s` whenever no bulk mutation is in flight.
#[derive(Debug)]
struct Layout {
    slot_to_card: Vec<Option<Card>>,
    card_to_slot: Vec<Option<Slot>>,
}

impl Layout {
    fn new(slots: usize, cards: usize) -> Self {
        Self {
            slot_to_card: vec![None; slots],
            card_to_slot: vec![None; cards],
        }
    }
    fn card(&self, slot: Slot) -> Option<Card> {
        self.slot_to_card[slot]
    }
    fn slot(&self, card: Card) -> Option<Slot> {
        self.card_to_slot[usize::from(card)]
    }
}

/// One player's token marks: per-slot flags plus a cached count.
/// The count never leaves `[0, set_size]`.
#[derive(Debug)]
struct Marks {
    slots: Vec<bool>,
    count: usize,
}

impl Marks {
    fn new(slots: usize) -> Self {
        Self {
            slots: vec![false; slots],
            count: 0,
        }
    }
    fn has(&self, slot: Slot) -> bool {
        self.slots[slot]
    }
    fn set(&mut self, slot: Slot) {
        if !self.slots[slot] {
            self.slots[slot] = true;
            self.count += 1;
        }
    }
    fn clear(&mut self, slot: Slot) {
        if self.slots[slot] {
            self.slots[slot] = false;
            self.count -= 1;
        }
    }
    fn marked(&self) -> impl Iterator<Item = Slot> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(|(slot, _)| slot)
    }
}

/// Single source of truth for board occupancy and token marks, and the
/// synchronization boundary between many concurrent per-player mutators and
/// the coordinator's bulk mutations.
///
/// Locking discipline: a toggle takes only the calling player's mark lock,
/// then a layout read lock. An exclusive session takes every mark lock in
/// ascending player order, then the layout write lock. The `sealed` flag
/// parks toggles that arrive while a session is draining or holding locks;
/// parked toggles are woken when the session drops.
pub struct Board {
    slots: usize,
    set_size: usize,
    settle: Duration,
    layout: RwLock<Layout>,
    marks: Vec<Mutex<Marks>>,
    sealed: AtomicBool,
    unsealed: Notify,
    ui: Arc<dyn Ui>,
}

impl Board {
    pub fn new(config: &Config, ui: Arc<dyn Ui>) -> Self {
        let slots = config.table_size();
        Self {
            slots,
            set_size: config.set_size,
            settle: config.settle_delay,
            layout: RwLock::new(Layout::new(slots, config.deck_size)),
            marks: (0..config.players).map(|_| Mutex::new(Marks::new(slots))).collect(),
            sealed: AtomicBool::new(false),
            unsealed: Notify::new(),
            ui,
        }
    }

    /// Total slot count.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Toggle `player`'s token on `slot`. Parks while a bulk mutation is in
    /// progress. A marked slot is unmarked; marking beyond a full claim is
    /// rejected with no state change. Returns the resulting count so the
    /// caller can detect completing a claim.
    pub async fn toggle(&self, player: Position, slot: Slot) -> Toggle {
        loop {
            let unsealed = self.unsealed.notified();
            if !self.sealed.load(Ordering::Acquire) {
                break;
            }
            unsealed.await;
        }
        let mut marks = self.marks[player].lock().await;
        let layout = self.layout.read().await;
        if marks.has(slot) {
            marks.clear(slot);
            self.ui.remove_token(player, slot);
            Toggle::Removed(marks.count)
        } else if layout.card(slot).is_none() || marks.count == self.set_size {
            Toggle::Rejected
        } else {
            marks.set(slot);
            self.ui.place_token(player, slot);
            Toggle::Placed(marks.count)
        }
    }

    /// Cards under the player's marks, only if the claim is complete.
    /// Guards the coordinator against verifying a partial or stale claim:
    /// cards are read through the live marks, so every returned card is
    /// resident at the time of the call.
    pub async fn current_claim(&self, player: Position) -> Option<Vec<Card>> {
        let marks = self.marks[player].lock().await;
        let layout = self.layout.read().await;
        if marks.count != self.set_size {
            return None;
        }
        let cards: Vec<Card> = marks.marked().filter_map(|slot| layout.card(slot)).collect();
        (cards.len() == self.set_size).then_some(cards)
    }

    /// Begin a bulk mutation: deal, removal after a successful claim, or
    /// full reshuffle. Seals the board, drains every in-flight toggle by
    /// acquiring the mark locks in ascending player order, then takes the
    /// layout write lock. Concurrent sessions serialize on the same order.
    pub async fn exclusive(&self) -> Exclusive<'_> {
        self.sealed.store(true, Ordering::Release);
        let mut marks = Vec::with_capacity(self.marks.len());
        for lock in &self.marks {
            marks.push(lock.lock().await);
        }
        let layout = self.layout.write().await;
        Exclusive {
            board: self,
            layout,
            marks,
        }
    }

    /// Slots currently holding no card.
    pub async fn vacancies(&self) -> Vec<Slot> {
        let layout = self.layout.read().await;
        (0..self.slots).filter(|s| layout.card(*s).is_none()).collect()
    }

    /// Every card currently on the board.
    pub async fn cards_in_play(&self) -> Vec<Card> {
        let layout = self.layout.read().await;
        layout.slot_to_card.iter().flatten().copied().collect()
    }

    pub async fn count_cards(&self) -> usize {
        let layout = self.layout.read().await;
        layout.slot_to_card.iter().flatten().count()
    }

    /// Point-in-time copy of the slot→card relation.
    pub async fn snapshot(&self) -> Vec<Option<Card>> {
        self.layout.read().await.slot_to_card.clone()
    }

    /// Log every legal combination currently on the board, with slots and
    /// feature vectors.
    pub async fn hints(&self, oracle: &dyn Oracle) {
        let snapshot = self.snapshot().await;
        let cards: Vec<Card> = snapshot.iter().flatten().copied().collect();
        for combo in oracle.find_legal(&cards, usize::MAX) {
            let slots: Vec<Slot> = combo
                .iter()
                .filter_map(|card| snapshot.iter().position(|s| *s == Some(*card)))
                .collect();
            log::info!(
                "[board] hint: slots {:?} features {:?}",
                slots,
                oracle.features(&combo)
            );
        }
    }
}

/// Exclusive mutation session over the whole board.
/// Holds every player's mark lock plus the layout write lock; dropping the
/// session releases them, unseals the board, and wakes parked toggles.
pub struct Exclusive<'a> {
    board: &'a Board,
    layout: RwLockWriteGuard<'a, Layout>,
    marks: Vec<MutexGuard<'a, Marks>>,
}

impl Exclusive<'_> {
    /// Place a card on a vacant slot, after the configured settle delay.
    pub async fn place(&mut self, card: Card, slot: Slot) {
        tokio::time::sleep(self.board.settle).await;
        self.layout.slot_to_card[slot] = Some(card);
        self.layout.card_to_slot[usize::from(card)] = Some(slot);
        self.board.ui.place_card(card, slot);
    }

    /// Remove the card at `slot`, clearing every player's mark on it.
    pub async fn remove(&mut self, slot: Slot) {
        tokio::time::sleep(self.board.settle).await;
        for marks in self.marks.iter_mut() {
            marks.clear(slot);
        }
        if let Some(card) = self.layout.slot_to_card[slot].take() {
            self.layout.card_to_slot[usize::from(card)] = None;
            self.board.ui.remove_tokens(slot);
            self.board.ui.remove_card(slot);
        }
    }

    pub fn card_at(&self, slot: Slot) -> Option<Card> {
        self.layout.card(slot)
    }

    pub fn slot_of(&self, card: Card) -> Option<Slot> {
        self.layout.slot(card)
    }
}

impl Drop for Exclusive<'_> {
    fn drop(&mut self) {
        // Guard fields release after this body; a toggle woken here at worst
        // queues briefly on its own mark lock.
        self.board.sealed.store(false, Ordering::Release);
        self.board.unsealed.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::NullUi;

    fn board(players: usize) -> Board {
        let config = Config {
            players,
            settle_delay: Duration::ZERO,
            ..Config::default()
        };
        Board::new(&config, Arc::new(NullUi))
    }

    async fn deal(board: &Board, cards: &[(u8, Slot)]) {
        let mut session = board.exclusive().await;
        for (card, slot) in cards {
            session.place(Card::from(*card), *slot).await;
        }
    }

    #[tokio::test]
    async fn relations_stay_inverse() {
        let board = board(1);
        deal(&board, &[(7, 2), (8, 5)]).await;
        let session = board.exclusive().await;
        assert_eq!(session.card_at(2), Some(Card::from(7)));
        assert_eq!(session.slot_of(Card::from(7)), Some(2));
        assert_eq!(session.card_at(5), Some(Card::from(8)));
        assert_eq!(session.slot_of(Card::from(8)), Some(5));
        assert_eq!(session.card_at(0), None);
    }

    #[tokio::test]
    async fn double_toggle_returns_to_original_state() {
        let board = board(1);
        deal(&board, &[(0, 0)]).await;
        assert_eq!(board.toggle(0, 0).await, Toggle::Placed(1));
        assert_eq!(board.toggle(0, 0).await, Toggle::Removed(0));
        assert_eq!(board.toggle(0, 0).await, Toggle::Placed(1));
    }

    #[tokio::test]
    async fn vacant_slot_is_rejected() {
        let board = board(1);
        assert_eq!(board.toggle(0, 3).await, Toggle::Rejected);
    }

    #[tokio::test]
    async fn full_claim_rejects_a_fourth_mark() {
        let board = board(1);
        deal(&board, &[(0, 0), (1, 1), (2, 2), (3, 3)]).await;
        assert_eq!(board.toggle(0, 0).await, Toggle::Placed(1));
        assert_eq!(board.toggle(0, 1).await, Toggle::Placed(2));
        assert_eq!(board.toggle(0, 2).await, Toggle::Placed(3));
        assert_eq!(board.toggle(0, 3).await, Toggle::Rejected);
        // untoggling a marked slot is still allowed at a full claim
        assert_eq!(board.toggle(0, 2).await, Toggle::Removed(2));
        assert_eq!(board.toggle(0, 3).await, Toggle::Placed(3));
    }

    #[tokio::test]
    async fn current_claim_requires_exact_count() {
        let board = board(2);
        deal(&board, &[(0, 0), (1, 1), (2, 2)]).await;
        board.toggle(0, 0).await;
        board.toggle(0, 1).await;
        assert_eq!(board.current_claim(0).await, None);
        board.toggle(0, 2).await;
        let cards = board.current_claim(0).await.unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(board.current_claim(1).await, None);
    }

    #[tokio::test]
    async fn removal_clears_marks() {
        let board = board(1);
        deal(&board, &[(0, 0), (1, 1), (2, 2), (3, 3)]).await;
        board.toggle(0, 0).await;
        board.toggle(0, 1).await;
        board.toggle(0, 2).await;
        let mut session = board.exclusive().await;
        session.remove(1).await;
        drop(session);
        assert_eq!(board.current_claim(0).await, None);
        // the freed count admits a new mark
        assert_eq!(board.toggle(0, 3).await, Toggle::Placed(3));
    }

    #[tokio::test]
    async fn toggle_parks_during_exclusive_session() {
        let board = Arc::new(board(1));
        deal(&board, &[(0, 0)]).await;
        let session = board.exclusive().await;
        let parked = {
            let board = board.clone();
            tokio::spawn(async move { board.toggle(0, 0).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!parked.is_finished());
        drop(session);
        assert_eq!(parked.await.unwrap(), Toggle::Placed(1));
    }

    #[tokio::test]
    async fn board_reads() {
        let board = board(1);
        deal(&board, &[(4, 1), (9, 3)]).await;
        assert_eq!(board.count_cards().await, 2);
        assert_eq!(board.vacancies().await.len(), board.slots() - 2);
        let mut in_play = board.cards_in_play().await;
        in_play.sort_unstable();
        assert_eq!(in_play, vec![Card::from(4), Card::from(9)]);
    }
}

use super::board::Board;
use super::board::Toggle;
use super::claim::Claim;
use super::claim::Verdict;
use crate::cards::Card;
use crate::oracle::Oracle;
use crate::ui::Ui;
use crate::{Config, Position, Slot};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Produces slot intents for an autonomous seat.
///
/// A tactic task feeds the same bounded mailbox as external input and is
/// subject to the same backpressure, so it is indistinguishable from manual
/// play at the mailbox boundary.
#[async_trait::async_trait]
pub trait Tactic: Send {
    /// Choose the next slot to toggle.
    async fn choose(&mut self, board: &Board) -> Slot;
}

/// House player pressing uniformly random slots.
pub struct Fish(SmallRng);

impl Fish {
    pub fn new() -> Self {
        Self(SmallRng::from_os_rng())
    }
}

impl Default for Fish {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tactic for Fish {
    async fn choose(&mut self, board: &Board) -> Slot {
        self.0.random_range(0..board.slots())
    }
}

/// Oracle-assisted player: marks the slots of an actual legal combination
/// when one is on the board, and fishes otherwise. Works from a snapshot,
/// so a reshuffle between choices can leave it pressing stale slots; those
/// claims lose the race like anyone else's.
pub struct Shark {
    oracle: Arc<dyn Oracle>,
    pending: Vec<Slot>,
    fallback: Fish,
}

impl Shark {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            pending: Vec::new(),
            fallback: Fish::new(),
        }
    }
}

#[async_trait::async_trait]
impl Tactic for Shark {
    async fn choose(&mut self, board: &Board) -> Slot {
        if let Some(slot) = self.pending.pop() {
            return slot;
        }
        let snapshot = board.snapshot().await;
        let cards: Vec<Card> = snapshot.iter().flatten().copied().collect();
        if let Some(combo) = self.oracle.find_legal(&cards, 1).pop() {
            self.pending = combo
                .iter()
                .filter_map(|card| snapshot.iter().position(|s| *s == Some(*card)))
                .collect();
        }
        match self.pending.pop() {
            Some(slot) => slot,
            None => self.fallback.choose(board).await,
        }
    }
}

/// Handle for submitting intents into a seat's mailbox.
#[derive(Clone)]
pub struct PlayerHandle {
    player: Position,
    intents: mpsc::Sender<Slot>,
}

impl PlayerHandle {
    pub(crate) fn new(player: Position, intents: mpsc::Sender<Slot>) -> Self {
        Self { player, intents }
    }

    pub fn player(&self) -> Position {
        self.player
    }

    /// Queue a slot toggle for this seat. Waits while the mailbox already
    /// holds a full claim's worth of unprocessed intents.
    pub async fn press(&self, slot: Slot) -> anyhow::Result<()> {
        self.intents
            .send(slot)
            .await
            .map_err(|_| anyhow::anyhow!("seat P{} has shut down", self.player))
    }
}

/// Mailbox-driven player actor. One task per seat; an optional tactic task
/// feeds the mailbox for autonomous seats.
///
/// Interruption of any wait here is the cooperative termination signal,
/// never an error: every suspension point races the stop flag.
pub struct Agent {
    id: Position,
    set_size: usize,
    point_freeze: Duration,
    penalty_freeze: Duration,
    board: Arc<Board>,
    ui: Arc<dyn Ui>,
    intents: mpsc::Receiver<Slot>,
    claims: mpsc::UnboundedSender<Claim>,
    stop: watch::Receiver<bool>,
    producer: Option<JoinHandle<()>>,
}

impl Agent {
    /// Spawns the agent task, plus a producer task when a tactic is given.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        id: Position,
        config: &Config,
        board: Arc<Board>,
        ui: Arc<dyn Ui>,
        intents: mpsc::Receiver<Slot>,
        feeder: mpsc::Sender<Slot>,
        claims: mpsc::UnboundedSender<Claim>,
        stop: watch::Receiver<bool>,
        tactic: Option<Box<dyn Tactic>>,
    ) -> JoinHandle<()> {
        let producer = tactic.map(|t| Self::produce(id, t, board.clone(), feeder, stop.clone()));
        let agent = Self {
            id,
            set_size: config.set_size,
            point_freeze: config.point_freeze,
            penalty_freeze: config.penalty_freeze,
            board,
            ui,
            intents,
            claims,
            stop,
            producer,
        };
        tokio::spawn(agent.run())
    }

    /// Autonomous input producer: an independent task issuing tactic-chosen
    /// slots into the seat's mailbox, under the mailbox's backpressure.
    fn produce(
        id: Position,
        mut tactic: Box<dyn Tactic>,
        board: Arc<Board>,
        feeder: mpsc::Sender<Slot>,
        mut stop: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            log::debug!("[agent P{}] producer starting", id);
            while !*stop.borrow() {
                let slot = tactic.choose(&board).await;
                tokio::select! {
                    biased;
                    _ = stop.wait_for(|&s| s) => break,
                    sent = feeder.send(slot) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
            log::debug!("[agent P{}] producer terminated", id);
        })
    }

    async fn run(mut self) {
        log::debug!("[agent P{}] starting", self.id);
        loop {
            let slot = tokio::select! {
                biased;
                _ = self.stop.wait_for(|&s| s) => break,
                next = self.intents.recv() => match next {
                    Some(slot) => slot,
                    None => break,
                },
            };
            match self.board.toggle(self.id, slot).await {
                Toggle::Placed(count) if count == self.set_size => self.claim().await,
                outcome => log::trace!("[agent P{}] slot {}: {:?}", self.id, slot, outcome),
            }
        }
        if let Some(producer) = self.producer.take() {
            let _ = producer.await;
        }
        log::debug!("[agent P{}] terminated", self.id);
    }

    /// Hand the completed claim to the coordinator and block for resolution.
    async fn claim(&mut self) {
        let (claim, barrier) = Claim::new(self.id);
        if self.claims.send(claim).is_err() {
            // coordinator is gone; the loop will observe the stop flag
            return;
        }
        log::debug!("[agent P{}] claim submitted", self.id);
        let verdict = tokio::select! {
            biased;
            _ = self.stop.wait_for(|&s| s) => return,
            verdict = barrier => verdict,
        };
        match verdict {
            Ok(Verdict::Point) => self.freeze(self.point_freeze).await,
            Ok(Verdict::Penalty) => self.freeze(self.penalty_freeze).await,
            // claim died unjudged at teardown: no freeze, no display update
            Err(_) => {}
        }
    }

    /// Post-resolution cooldown, surfaced as a one-second countdown.
    /// Intents queued while frozen are discarded on exit, so a frozen seat
    /// never replays stale input.
    async fn freeze(&mut self, total: Duration) {
        let mut remaining = total;
        while !remaining.is_zero() && !*self.stop.borrow() {
            self.ui.set_freeze(self.id, remaining);
            let step = remaining.min(Duration::from_secs(1));
            tokio::select! {
                biased;
                _ = self.stop.wait_for(|&s| s) => break,
                _ = tokio::time::sleep(step) => remaining = remaining.saturating_sub(step),
            }
        }
        self.ui.set_freeze(self.id, Duration::ZERO);
        while self.intents.try_recv().is_ok() {}
    }
}

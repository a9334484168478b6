//! Live game assembly and lifecycle.
//!
//! This module wires the actors together and runs a game to its winner
//! announcement, coordinating the shared board, the player agents, and the
//! coordinator through message-passing channels.
//!
//! ## Architecture
//!
//! - [`Room`] — seats players, spawns their tasks, runs the coordinator
//! - [`Board`] — shared slot/card state and the exclusive-mutation barrier
//! - [`Agent`] — per-seat mailbox consumer, with optional [`Tactic`] producer
//! - [`Coordinator`] — deal, claim verification, round clock, scoring
//! - [`Claim`] — one-shot handoff from an agent to the coordinator
//! - [`Stopper`] — external termination request, honored at every wait

mod agent;
mod board;
mod claim;
mod coordinator;
mod window;

pub use agent::*;
pub use board::*;
pub use claim::*;
pub use coordinator::*;
pub use window::*;

use crate::config::Config;
use crate::oracle::FeatureOracle;
use crate::oracle::Oracle;
use crate::ui::LogUi;
use crate::ui::Ui;
use crate::{Position, Slot};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::watch;

/// External termination request. Raising it interrupts every blocking wait
/// in the game; the actors observe the flag and unwind cleanly. Idempotent.
#[derive(Clone)]
pub struct Stopper(Arc<watch::Sender<bool>>);

impl Stopper {
    pub(crate) fn new(tx: watch::Sender<bool>) -> Self {
        Self(Arc::new(tx))
    }
    pub fn stop(&self) {
        let _ = self.0.send(true);
    }
}

/// One seat's pre-spawn state.
struct Seat {
    tactic: Option<Box<dyn Tactic>>,
    intents_tx: mpsc::Sender<Slot>,
    intents_rx: mpsc::Receiver<Slot>,
}

/// A single in-process game, from construction to the winner set.
///
/// Seats are filled before `run`; autonomous seats bring a [`Tactic`],
/// manual seats are driven through their [`PlayerHandle`]. `run` spawns one
/// task per agent (plus one per tactic), drives the coordinator on the
/// calling task, and joins everything before returning the winners.
pub struct Room {
    config: Config,
    board: Arc<Board>,
    oracle: Arc<dyn Oracle>,
    ui: Arc<dyn Ui>,
    seats: Vec<Seat>,
    stop_tx: Stopper,
    stop_rx: watch::Receiver<bool>,
}

impl Room {
    pub fn new(config: Config) -> Self {
        Self::assemble(config, Arc::new(FeatureOracle::default()), Arc::new(LogUi))
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_ui(mut self, ui: Arc<dyn Ui>) -> Self {
        self.ui = ui;
        self.board = Arc::new(Board::new(&self.config, self.ui.clone()));
        self
    }

    fn assemble(config: Config, oracle: Arc<dyn Oracle>, ui: Arc<dyn Ui>) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let board = Arc::new(Board::new(&config, ui.clone()));
        Self {
            config,
            board,
            oracle,
            ui,
            seats: Vec::new(),
            stop_tx: Stopper::new(stop_tx),
            stop_rx,
        }
    }

    /// Seat a player. Autonomous seats bring a tactic; manual seats pass
    /// `None` and submit intents through the returned handle. The mailbox
    /// is bounded to one claim's worth of intents.
    pub fn sit(&mut self, tactic: Option<Box<dyn Tactic>>) -> Result<PlayerHandle> {
        anyhow::ensure!(
            self.seats.len() < self.config.players,
            "table is full: {} seats",
            self.config.players
        );
        let player = self.seats.len();
        let (intents_tx, intents_rx) = mpsc::channel(self.config.set_size);
        self.seats.push(Seat {
            tactic,
            intents_tx: intents_tx.clone(),
            intents_rx,
        });
        Ok(PlayerHandle::new(player, intents_tx))
    }

    /// Handle for an already-seated player.
    pub fn handle(&self, player: Position) -> Option<PlayerHandle> {
        self.seats
            .get(player)
            .map(|seat| PlayerHandle::new(player, seat.intents_tx.clone()))
    }

    /// Termination request handle. Usable from any task, any time.
    pub fn stopper(&self) -> Stopper {
        self.stop_tx.clone()
    }

    /// Run the game to completion: spawn every agent, drive the round
    /// lifecycle, and join all tasks once the winners are announced or
    /// termination is requested.
    pub async fn run(self) -> Result<Vec<Position>> {
        anyhow::ensure!(
            self.seats.len() == self.config.players,
            "{} of {} seats filled",
            self.seats.len(),
            self.config.players
        );
        let (claims_tx, claims_rx) = mpsc::unbounded_channel();
        let agents: Vec<_> = self
            .seats
            .into_iter()
            .enumerate()
            .map(|(player, seat)| {
                Agent::spawn(
                    player,
                    &self.config,
                    self.board.clone(),
                    self.ui.clone(),
                    seat.intents_rx,
                    seat.intents_tx,
                    claims_tx.clone(),
                    self.stop_rx.clone(),
                    seat.tactic,
                )
            })
            .collect();
        drop(claims_tx);
        let coordinator = Coordinator::new(
            self.config,
            self.board,
            self.oracle,
            self.ui,
            claims_rx,
            self.stop_rx,
            self.stop_tx,
        );
        let winners = coordinator.run().await;
        for agent in agents {
            let _ = agent.await;
        }
        Ok(winners)
    }
}

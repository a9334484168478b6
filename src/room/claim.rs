use crate::Position;
use tokio::sync::oneshot;

/// Judgement on a completed claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Legal combination: the cards leave the board and a point is awarded.
    Point,
    /// Illegal combination, or a claim invalidated by a racing board mutation.
    Penalty,
}

/// A player's assertion that their marked cards form a legal combination.
///
/// Created by an agent the moment its mark count reaches the set size,
/// consumed exactly once by the coordinator. `resolve` takes the claim by
/// value, so the resolve-once contract is enforced by the type system.
/// Dropping a claim unresolved releases the waiting agent with no verdict,
/// which only happens at teardown.
#[derive(Debug)]
pub struct Claim {
    player: Position,
    reply: oneshot::Sender<Verdict>,
}

impl Claim {
    /// A fresh claim plus the completion barrier its owner blocks on.
    pub fn new(player: Position) -> (Self, oneshot::Receiver<Verdict>) {
        let (reply, barrier) = oneshot::channel();
        (Self { player, reply }, barrier)
    }

    pub fn player(&self) -> Position {
        self.player
    }

    /// Release the waiting agent. Called after all state mutation for this
    /// claim is finished, in every resolution path.
    pub fn resolve(self, verdict: Verdict) {
        let _ = self.reply.send(verdict);
    }
}

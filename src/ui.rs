use crate::cards::Card;
use crate::{Position, Score, Slot};
use std::time::Duration;

/// Fire-and-forget display sink.
/// The engine never consumes a return value from any of these calls;
/// rendering is entirely the sink's concern. Implementations must tolerate
/// being called from several tasks at once.
pub trait Ui: Send + Sync {
    fn place_card(&self, card: Card, slot: Slot);
    fn remove_card(&self, slot: Slot);
    fn place_token(&self, player: Position, slot: Slot);
    fn remove_token(&self, player: Position, slot: Slot);
    /// Clear every player's token on one slot.
    fn remove_tokens(&self, slot: Slot);
    /// Clear every token on the board.
    fn clear_tokens(&self);
    /// Remaining cooldown for a frozen player; zero clears the display.
    fn set_freeze(&self, player: Position, remaining: Duration);
    /// Remaining round time, flagged once it is running low.
    fn set_countdown(&self, remaining: Duration, low: bool);
    fn set_score(&self, player: Position, score: Score);
    /// Final winner set. Ties preserved, so more than one id is possible.
    fn announce_winners(&self, winners: &[Position]);
}

/// Renders the game through the log facade. The only display technology
/// this crate ships.
pub struct LogUi;

impl Ui for LogUi {
    fn place_card(&self, card: Card, slot: Slot) {
        log::debug!("[ui] card {} placed on slot {}", card, slot);
    }
    fn remove_card(&self, slot: Slot) {
        log::debug!("[ui] card removed from slot {}", slot);
    }
    fn place_token(&self, player: Position, slot: Slot) {
        log::debug!("[ui] P{} token on slot {}", player, slot);
    }
    fn remove_token(&self, player: Position, slot: Slot) {
        log::debug!("[ui] P{} token off slot {}", player, slot);
    }
    fn remove_tokens(&self, slot: Slot) {
        log::debug!("[ui] slot {} tokens cleared", slot);
    }
    fn clear_tokens(&self) {
        log::debug!("[ui] all tokens cleared");
    }
    fn set_freeze(&self, player: Position, remaining: Duration) {
        log::info!("[ui] P{} frozen for {}s", player, remaining.as_secs());
    }
    fn set_countdown(&self, remaining: Duration, low: bool) {
        match low {
            true => log::debug!("[ui] countdown {}ms (low)", remaining.as_millis()),
            false => log::trace!("[ui] countdown {}ms", remaining.as_millis()),
        }
    }
    fn set_score(&self, player: Position, score: Score) {
        log::info!("[ui] P{} score {}", player, score);
    }
    fn announce_winners(&self, winners: &[Position]) {
        log::info!("[ui] winners: {:?}", winners);
    }
}

/// Discards everything. For tests and headless embedding.
pub struct NullUi;

impl Ui for NullUi {
    fn place_card(&self, _: Card, _: Slot) {}
    fn remove_card(&self, _: Slot) {}
    fn place_token(&self, _: Position, _: Slot) {}
    fn remove_token(&self, _: Position, _: Slot) {}
    fn remove_tokens(&self, _: Slot) {}
    fn clear_tokens(&self) {}
    fn set_freeze(&self, _: Position, _: Duration) {}
    fn set_countdown(&self, _: Duration, _: bool) {}
    fn set_score(&self, _: Position, _: Score) {}
    fn announce_winners(&self, _: &[Position]) {}
}

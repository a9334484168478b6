use std::time::Duration;
use tokio::time::Instant;

/// Round deadline tracking: the interval after which, absent a successful
/// claim, the board is fully reshuffled. Recalculated whenever the board
/// composition changes.
#[derive(Debug)]
pub struct RoundWindow {
    turn: Duration,
    warning: Duration,
    deadline: Instant,
}

impl RoundWindow {
    pub fn new(turn: Duration, warning: Duration) -> Self {
        Self {
            turn,
            warning,
            deadline: Instant::now() + turn,
        }
    }

    /// Restart the window from now.
    pub fn reset(&mut self) {
        self.deadline = Instant::now() + self.turn;
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// True once remaining time drops under the warning threshold.
    pub fn low(&self) -> bool {
        self.remaining() <= self.warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn fresh_window_is_open() {
        let window = RoundWindow::new(Duration::from_secs(60), Duration::from_secs(5));
        assert!(!window.expired());
        assert!(!window.low());
        assert!(window.remaining() <= Duration::from_secs(60));
    }
    #[test]
    fn zero_length_window_is_expired() {
        let window = RoundWindow::new(Duration::ZERO, Duration::ZERO);
        assert!(window.expired());
        assert_eq!(window.remaining(), Duration::ZERO);
    }
    #[test]
    fn short_window_is_low() {
        let window = RoundWindow::new(Duration::from_secs(3), Duration::from_secs(5));
        assert!(window.low());
        assert!(!window.expired());
    }
    #[test]
    fn reset_reopens() {
        let mut window = RoundWindow::new(Duration::ZERO, Duration::ZERO);
        assert!(window.expired());
        window.turn = Duration::from_secs(60);
        window.reset();
        assert!(!window.expired());
    }
}

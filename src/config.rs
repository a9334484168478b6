use std::time::Duration;

/// Construction-time parameters for a single game.
/// Read-only once the room is built.
#[derive(Debug, Clone)]
pub struct Config {
    /// Board rows.
    pub rows: usize,
    /// Board columns.
    pub columns: usize,
    /// Number of seats at the table.
    pub players: usize,
    /// Cards required to constitute one claimable combination.
    pub set_size: usize,
    /// Total cards in the universe; ids run over `0..deck_size`.
    pub deck_size: usize,
    /// Round length before a full reshuffle.
    pub turn_timeout: Duration,
    /// Remaining round time under which the countdown is flagged as running low.
    pub warning_time: Duration,
    /// Cooldown imposed on a player after a successful claim.
    pub point_freeze: Duration,
    /// Cooldown imposed on a player after a rejected claim.
    pub penalty_freeze: Duration,
    /// Simulated render latency applied to each card placement and removal.
    pub settle_delay: Duration,
    /// Claim mailbox poll interval; drives countdown refreshes between claims.
    pub poll_interval: Duration,
    /// Log the legal combinations present on the board after each deal.
    pub hints: bool,
}

impl Config {
    /// Total slot count on the board.
    pub fn table_size(&self) -> usize {
        self.rows * self.columns
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: 3,
            columns: 4,
            players: 2,
            set_size: 3,
            deck_size: 81,
            turn_timeout: Duration::from_secs(60),
            warning_time: Duration::from_secs(5),
            point_freeze: Duration::from_secs(1),
            penalty_freeze: Duration::from_secs(3),
            settle_delay: Duration::from_millis(100),
            poll_interval: Duration::from_millis(100),
            hints: false,
        }
    }
}

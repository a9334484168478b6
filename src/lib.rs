//! Real-time multiplayer card-matching engine.
//!
//! A shared board of cards is watched by several independent player agents
//! who mark candidate combinations by toggling per-slot tokens. A central
//! coordinator deals cards, arbitrates claims, enforces round timing, and
//! detects the end of the game. Players and coordinator communicate through
//! message-passing channels; the board is the synchronization boundary
//! between many per-player mutators and the coordinator's bulk mutations.
//!
//! ## Architecture
//!
//! - [`Room`] — assembles the table, seats players, runs the game to a winner set
//! - [`Board`] — shared slot/card state, token marks, exclusive-mutation barrier
//! - [`Agent`] — mailbox-driven player task, one per seat
//! - [`Coordinator`] — deal/claim/timeout round lifecycle and scoring
//! - [`Oracle`] — pluggable legality rules for card combinations
//! - [`Ui`] — fire-and-forget display sink

pub mod cards;
pub mod config;
pub mod oracle;
pub mod room;
pub mod ui;

pub use cards::*;
pub use config::*;
pub use oracle::*;
pub use room::*;
pub use ui::*;

/// Seat index identifying a player, 0-based.
pub type Position = usize;
/// Index of a board position that may or may not hold a card.
pub type Slot = usize;
/// Per-player point total. Monotonically non-decreasing within a game.
pub type Score = u32;

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

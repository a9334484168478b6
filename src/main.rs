//! Demo table: autonomous seats play a full game to the winner announcement.
//! Ctrl-C requests termination; the game unwinds and still announces.

use matchroom::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    let config = Config {
        hints: true,
        ..Config::default()
    };
    let oracle = Arc::new(FeatureOracle::default());
    let mut room = Room::new(config).with_oracle(oracle.clone());
    room.sit(Some(Box::new(Shark::new(oracle))))?;
    room.sit(Some(Box::new(Fish::new())))?;
    let stopper = room.stopper();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, stopping game");
            stopper.stop();
        }
    });
    let winners = room.run().await?;
    log::info!("game over, winners: {:?}", winners);
    Ok(())
}

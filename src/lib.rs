pub mod config;
pub mod db;
pub mod error;
pub mod scheduler;
pub mod stats;
mod utils;

use anyhow::{Context, Result};

use config::StatsConfig;
use db::Database;
use scheduler::Scheduler;
use stats::{StatsPipeline, WordFrequencyIndexer};

pub use error::{StatsError, StatsResult};

/// Opens the store, starts the periodic jobs and runs until Ctrl-C.
pub async fn run(config: StatsConfig) -> Result<()> {
    config.validate()?;

    log::info!("Voicy stats starting up...");

    let database = Database::new(config.database_path.clone())?;
    let pipeline = StatsPipeline::new(database.clone(), &config);
    let indexer = WordFrequencyIndexer::new(database, config.word_batch_size);

    let mut scheduler = Scheduler::new(pipeline, indexer, &config);
    scheduler.start()?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    log::info!("Shutting down");
    scheduler.stop().await
}

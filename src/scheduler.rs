use std::future::Future;

use anyhow::{bail, Context, Result};
use log::{error, info};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::StatsConfig;
use crate::stats::{StatsPipeline, WordFrequencyIndexer};

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Owns the two periodic jobs: the stats snapshot cycle (first run at start)
/// and the word index rebuild.
pub struct Scheduler {
    pipeline: StatsPipeline,
    indexer: WordFrequencyIndexer,
    stats_interval: Duration,
    word_index_interval: Duration,
    word_index_on_start: bool,
    cancel_token: Option<CancellationToken>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(
        pipeline: StatsPipeline,
        indexer: WordFrequencyIndexer,
        config: &StatsConfig,
    ) -> Self {
        Self {
            pipeline,
            indexer,
            stats_interval: config.stats_interval(),
            word_index_interval: config.word_index_interval(),
            word_index_on_start: config.word_index_on_start,
            cancel_token: None,
            handles: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel_token.is_some()
    }

    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            bail!("scheduler already running");
        }

        let cancel_token = CancellationToken::new();

        let pipeline = self.pipeline.clone();
        self.handles.push(tokio::spawn(periodic_loop(
            "stats",
            self.stats_interval,
            true,
            cancel_token.clone(),
            move || {
                let pipeline = pipeline.clone();
                async move { pipeline.run_logged().await }
            },
        )));

        let indexer = self.indexer.clone();
        self.handles.push(tokio::spawn(periodic_loop(
            "word index",
            self.word_index_interval,
            self.word_index_on_start,
            cancel_token.clone(),
            move || {
                let indexer = indexer.clone();
                async move {
                    if let Err(err) = indexer.rebuild().await {
                        error!("Word count generation failed: {err}");
                    }
                }
            },
        )));

        info!(
            "Scheduler started (stats every {:?}, word index every {:?})",
            self.stats_interval, self.word_index_interval
        );
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Cancels both loops and waits for them. A job in flight is dropped at
    /// its next await point.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        for handle in self.handles.drain(..) {
            handle.await.context("scheduler task failed to join")?;
        }
        Ok(())
    }
}

async fn periodic_loop<F, Fut>(
    name: &'static str,
    period: Duration,
    run_immediately: bool,
    cancel_token: CancellationToken,
    mut job: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let start = if run_immediately {
        Instant::now()
    } else {
        Instant::now() + period
    };
    let mut ticker = time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tokio::select! {
                    _ = job() => {}
                    _ = cancel_token.cancelled() => break,
                }
            }
            _ = cancel_token.cancelled() => break,
        }
    }

    log_info!("{name} loop shutting down");
}

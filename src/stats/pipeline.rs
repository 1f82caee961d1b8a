use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use log::{error, warn};
use tokio::sync::Mutex;

use crate::config::StatsConfig;
use crate::db::{BucketSource, Database, SnapshotWrite, StatsSnapshot};
use crate::error::{StatsError, StatsResult};

use super::{
    buckets::TimeBucketAggregator,
    counts::CountAggregator,
    log_reader::read_response_times,
    snapshot::SnapshotWriter,
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Collects every aggregate and replaces the stored snapshot. Runs are
/// serialized; a failed or timed-out run leaves the previous snapshot as it
/// was.
#[derive(Clone)]
pub struct StatsPipeline {
    buckets: TimeBucketAggregator,
    counts: CountAggregator,
    writer: SnapshotWriter,
    response_log_path: PathBuf,
    run_timeout: Duration,
    run_lock: Arc<Mutex<()>>,
}

impl StatsPipeline {
    pub fn new(db: Database, config: &StatsConfig) -> Self {
        Self {
            buckets: TimeBucketAggregator::new(db.clone(), config.window_days),
            counts: CountAggregator::new(db.clone(), config.offsets),
            writer: SnapshotWriter::new(db),
            response_log_path: config.response_log_path.clone(),
            run_timeout: config.run_timeout(),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn run(&self) -> StatsResult<StatsSnapshot> {
        self.run_at(Utc::now()).await
    }

    /// The timeout covers collection and the write. A write still queued on
    /// the store thread when the deadline passes is dropped there, so a
    /// timed-out run never replaces the snapshot.
    pub async fn run_at(&self, now: DateTime<Utc>) -> StatsResult<StatsSnapshot> {
        let _guard = self.run_lock.lock().await;
        let deadline = Instant::now() + self.run_timeout;

        let snapshot = tokio::time::timeout_at(deadline.into(), self.collect(now))
            .await
            .map_err(|_| StatsError::Timeout(self.run_timeout))??;

        match self.writer.write(&snapshot, now, deadline).await? {
            Some(SnapshotWrite::Inserted) => log_info!("Stats snapshot created"),
            Some(SnapshotWrite::Updated) => log_info!("Stats snapshot updated"),
            None => return Err(StatsError::Timeout(self.run_timeout)),
        }

        Ok(snapshot)
    }

    /// Scheduler entry point: the outcome is logged and dropped.
    pub async fn run_logged(&self) {
        let started = Instant::now();
        match self.run().await {
            Ok(_) => log_info!(
                "New stats were generated in {}ms",
                started.elapsed().as_millis()
            ),
            Err(err) => error!("Stats generation failed: {err}"),
        }
    }

    async fn collect(&self, now: DateTime<Utc>) -> StatsResult<StatsSnapshot> {
        log_info!("Generating new stats");

        let (hourly_stats, chat_daily_stats, totals, response_time) = tokio::try_join!(
            self.buckets.aggregate(BucketSource::Voices, now),
            self.buckets.aggregate(BucketSource::Chats, now),
            self.counts.aggregate(),
            async { Ok::<_, StatsError>(self.response_times(now).await) },
        )?;

        Ok(StatsSnapshot {
            chat_count: totals.chat_count,
            voice_count: totals.voice_count,
            duration: totals.duration,
            hourly_stats,
            chat_daily_stats,
            response_time,
        })
    }

    /// Best effort: any failure only drops `responseTime` from the snapshot.
    async fn response_times(&self, now: DateTime<Utc>) -> Option<BTreeMap<i64, f64>> {
        let path = self.response_log_path.clone();
        let outcome = tokio::task::spawn_blocking(move || read_response_times(&path, now)).await;

        match outcome {
            Ok(Ok(report)) => {
                log_info!(
                    "Processed {} log lines, found {} time buckets ({} malformed)",
                    report.lines,
                    report.averages.len(),
                    report.malformed
                );
                Some(report.averages)
            }
            Ok(Err(err)) if err.is_not_found() => {
                log_warn!("Skipping response time stats: {err}");
                None
            }
            Ok(Err(err)) => {
                log_warn!("Failed to get response time stats: {err}");
                None
            }
            Err(join_err) => {
                warn!("response log reader panicked: {join_err}");
                None
            }
        }
    }
}

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::db::{
    CurrentStats, Database, Engine, EngineStats, SnapshotWrite, StatsSnapshot, WordCount,
};
use crate::error::{StatsError, StatsResult};

/// Message counters at or below this are left out of `CurrentStats`.
pub const MESSAGE_STATS_THRESHOLD: u64 = 50_000;
pub const TOP_WORDS_LIMIT: usize = 20;

#[derive(Clone)]
pub struct SnapshotWriter {
    db: Database,
}

impl SnapshotWriter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// `None` when `deadline` passed before the store thread got to the
    /// write; the stored snapshot is then unchanged.
    pub async fn write(
        &self,
        snapshot: &StatsSnapshot,
        now: DateTime<Utc>,
        deadline: Instant,
    ) -> StatsResult<Option<SnapshotWrite>> {
        let json = encode_snapshot(snapshot)?;
        self.db
            .upsert_snapshot_before(json, now, deadline)
            .await
            .map_err(|err| StatsError::aggregation("snapshot write", err))
    }
}

/// Serializes and checks that the document parses back as a JSON object.
pub fn encode_snapshot(snapshot: &StatsSnapshot) -> StatsResult<String> {
    let json = serde_json::to_string(snapshot)?;
    let parsed: serde_json::Value = serde_json::from_str(&json)?;
    if !parsed.is_object() {
        return Err(StatsError::Invalid(
            "snapshot must serialize to a JSON object".into(),
        ));
    }
    Ok(json)
}

/// Read side used by the reporting endpoints.
#[derive(Clone)]
pub struct StatsReader {
    db: Database,
}

impl StatsReader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn current_stats(&self) -> StatsResult<CurrentStats> {
        let stored = self
            .db
            .find_snapshot()
            .await
            .map_err(StatsError::store)?
            .ok_or_else(|| StatsError::not_found("stats snapshot"))?;
        let snapshot: StatsSnapshot = serde_json::from_str(&stored.json)?;
        let message_stats = self
            .db
            .message_stats_above(MESSAGE_STATS_THRESHOLD)
            .await
            .map_err(StatsError::store)?;

        Ok(CurrentStats {
            snapshot,
            message_stats,
        })
    }

    pub async fn top_words(&self, limit: usize) -> StatsResult<Vec<WordCount>> {
        self.db.top_words(limit).await.map_err(StatsError::store)
    }

    pub async fn engine_stats(&self, engine: Engine) -> StatsResult<EngineStats> {
        let (voice_count, chat_count) = tokio::try_join!(
            self.db.count_voices_by_engine(engine),
            self.db.count_chats_by_engine(engine),
        )
        .map_err(StatsError::store)?;

        Ok(EngineStats {
            engine,
            voice_count,
            chat_count,
        })
    }

    pub async fn health_check(&self) -> StatsResult<()> {
        self.db.health_check().await.map_err(StatsError::store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TimeBucket;
    use std::collections::BTreeMap;

    fn snapshot(response_time: Option<BTreeMap<i64, f64>>) -> StatsSnapshot {
        StatsSnapshot {
            chat_count: 2,
            voice_count: 5,
            duration: 40,
            hourly_stats: vec![
                TimeBucket { day_offset: 1, count: 0 },
                TimeBucket { day_offset: 0, count: 5 },
            ],
            chat_daily_stats: vec![
                TimeBucket { day_offset: 1, count: 1 },
                TimeBucket { day_offset: 0, count: 1 },
            ],
            response_time,
        }
    }

    #[test]
    fn wire_shape_matches_reporting_pages() {
        let json = encode_snapshot(&snapshot(Some(BTreeMap::from([(1_700_000_040, 0.5)])))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["chatCount"], 2);
        assert_eq!(value["voiceCount"], 5);
        assert_eq!(value["hourlyStats"][1]["_id"], 0);
        assert_eq!(value["hourlyStats"][1]["count"], 5);
        assert_eq!(value["responseTime"]["1700000040"], 0.5);
    }

    #[test]
    fn absent_response_time_is_omitted() {
        let json = encode_snapshot(&snapshot(None)).unwrap();
        assert!(!json.contains("responseTime"));

        let decoded: StatsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.response_time, None);
    }
}

//! Snapshot document and the read models built around it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Engine;

/// Records counted `day_offset` whole days before the run instant.
/// Serialized as `{"_id": offset, "count": n}`, the shape the reporting
/// pages read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeBucket {
    #[serde(rename = "_id")]
    pub day_offset: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub chat_count: u64,
    pub voice_count: u64,
    /// Seconds.
    pub duration: u64,
    /// Voice messages per day, oldest offset first.
    pub hourly_stats: Vec<TimeBucket>,
    pub chat_daily_stats: Vec<TimeBucket>,
    /// Minute-aligned Unix seconds to mean response latency in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<BTreeMap<i64, f64>>,
}

/// The persisted singleton row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotWrite {
    Inserted,
    Updated,
}

/// Named counter maintained by the bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageStat {
    pub name: String,
    pub count: u64,
}

/// What the stats endpoint returns: the snapshot plus the large message
/// counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStats {
    #[serde(flatten)]
    pub snapshot: StatsSnapshot,
    pub message_stats: Vec<MessageStat>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub engine: Engine,
    pub voice_count: u64,
    pub chat_count: u64,
}

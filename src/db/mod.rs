mod connection;
pub mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::{
    ChatRecord, CurrentStats, Engine, EngineStats, MessageStat, SnapshotWrite, StatsSnapshot,
    StoredSnapshot, TimeBucket, VoiceRecord, WordCount,
};
pub use repositories::{BucketSource, DAY_MS};

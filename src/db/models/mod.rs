pub mod chat;
pub mod engine;
pub mod stats;
pub mod voice;
pub mod word;

pub use chat::ChatRecord;
pub use engine::Engine;
pub use stats::{
    CurrentStats, EngineStats, MessageStat, SnapshotWrite, StatsSnapshot, StoredSnapshot,
    TimeBucket,
};
pub use voice::VoiceRecord;
pub use word::WordCount;

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, Duration, TimeZone, Utc};
use voicy_stats::config::{HistoricalOffsets, StatsConfig};
use voicy_stats::db::{ChatRecord, Database, Engine, VoiceRecord};

pub fn open_memory_db() -> Database {
    Database::in_memory().expect("open in-memory db")
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

pub fn test_config(response_log_path: PathBuf) -> StatsConfig {
    StatsConfig {
        response_log_path,
        offsets: HistoricalOffsets {
            extra_voice_count: 1_000,
            extra_duration: 50_000,
        },
        ..StatsConfig::default()
    }
}

pub fn voice_at(now: DateTime<Utc>, age: Duration, duration: u32, text: Option<&str>) -> VoiceRecord {
    VoiceRecord::new(
        "https://api.telegram.org/file/bot/voice.oga",
        Engine::Google,
        duration,
        "en-US",
        text.map(str::to_owned),
        now - age,
    )
}

pub fn voice_with_text(text: &str) -> VoiceRecord {
    voice_at(fixed_now(), Duration::hours(1), 10, Some(text))
}

pub fn chat_at(now: DateTime<Utc>, id: i64, age: Duration) -> ChatRecord {
    ChatRecord::new(id.to_string(), now - age)
}

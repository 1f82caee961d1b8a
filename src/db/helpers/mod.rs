use std::convert::TryFrom;

use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};

use crate::db::models::Engine;

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

/// Timestamps are stored as Unix milliseconds so the store can do the
/// day-offset arithmetic itself.
pub fn to_millis(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

pub fn from_millis(value: i64, field: &str) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value)
        .single()
        .ok_or_else(|| anyhow!("{field} holds out-of-range timestamp {value}"))
}

pub fn parse_engine(value: &str) -> Result<Engine> {
    match value {
        "wit" => Ok(Engine::Wit),
        "google" => Ok(Engine::Google),
        "yandex" => Ok(Engine::Yandex),
        "ashmanov" => Ok(Engine::Ashmanov),
        other => Err(anyhow!("unknown engine {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_survive_the_store() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(from_millis(to_millis(now), "created_at").unwrap(), now);
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert!(to_u64(-1, "count").is_err());
        assert_eq!(to_u64(42, "count").unwrap(), 42);
    }

    #[test]
    fn engines_parse_from_their_stored_names() {
        for engine in [Engine::Wit, Engine::Google, Engine::Yandex, Engine::Ashmanov] {
            assert_eq!(parse_engine(engine.as_str()).unwrap(), engine);
        }
        assert!(parse_engine("whisper").is_err());
    }
}

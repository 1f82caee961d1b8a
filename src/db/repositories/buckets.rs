use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::db::{
    connection::Database,
    helpers::{to_millis, to_u64},
};

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Timestamped record set the day-bucket query can run over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketSource {
    Voices,
    Chats,
}

impl BucketSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketSource::Voices => "voices",
            BucketSource::Chats => "chats",
        }
    }

    fn table(&self) -> &'static str {
        self.as_str()
    }

    fn timestamp_column(&self) -> &'static str {
        "created_at"
    }
}

impl Database {
    /// `(day_offset, count)` for records created in `(now - window_days, now)`,
    /// where `day_offset = floor((now - created_at) / 1 day)`. Days without
    /// records are absent.
    pub async fn count_by_day_offset(
        &self,
        source: BucketSource,
        now: DateTime<Utc>,
        window_days: u32,
    ) -> Result<Vec<(i64, u64)>> {
        let now_ms = to_millis(now);
        let window_start_ms = now_ms - i64::from(window_days) * DAY_MS;
        let sql = format!(
            "SELECT (?1 - {column}) / ?3 AS day_offset, COUNT(*)
             FROM {table}
             WHERE {column} > ?2 AND {column} < ?1
             GROUP BY day_offset
             ORDER BY day_offset ASC",
            table = source.table(),
            column = source.timestamp_column(),
        );

        self.execute(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![now_ms, window_start_ms, DAY_MS])?;
            let mut grouped = Vec::new();
            while let Some(row) = rows.next()? {
                let offset: i64 = row.get(0)?;
                let count: i64 = row.get(1)?;
                grouped.push((offset, to_u64(count, "bucket count")?));
            }
            Ok(grouped)
        })
        .await
    }
}

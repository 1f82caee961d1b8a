use anyhow::Result;
use rusqlite::params;

use crate::db::{
    connection::Database,
    helpers::{to_i64, to_u64},
    models::MessageStat,
};

impl Database {
    pub async fn set_message_stat(&self, name: &str, count: u64) -> Result<()> {
        let name = name.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO message_stats (name, count) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET count = excluded.count",
                params![name, to_i64(count)?],
            )?;
            Ok(())
        })
        .await
    }

    /// Counters strictly above `threshold`, largest first.
    pub async fn message_stats_above(&self, threshold: u64) -> Result<Vec<MessageStat>> {
        let threshold = to_i64(threshold)?;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT name, count FROM message_stats
                 WHERE count > ?1
                 ORDER BY count DESC, name ASC",
            )?;
            let mut rows = stmt.query(params![threshold])?;
            let mut stats = Vec::new();
            while let Some(row) = rows.next()? {
                stats.push(MessageStat {
                    name: row.get(0)?,
                    count: to_u64(row.get(1)?, "count")?,
                });
            }
            Ok(stats)
        })
        .await
    }
}
